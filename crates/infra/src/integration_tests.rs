//! Integration tests for the storefront infrastructure.
//!
//! Tests: CartStorage → SessionCartStore → checkout → StorefrontBackend
//!
//! Verifies:
//! - Carts survive reconnecting to the same SQLite file
//! - Unreadable stored carts degrade to the default instead of failing
//! - Checkout inserts land in the backend and redeem the promo code once

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use shopkit_cart::{LineItem, LineItemId, NewLineItem, ProductId};
use shopkit_core::{RecordId, SessionId};
use shopkit_orders::{build_order, OrderId};
use shopkit_pricing::{compute_totals, PricingConfig, ShippingMethod};
use shopkit_promos::{PromoApplication, PromoCode};
use shopkit_tracking::{TrackingEvent, TrackingStatus};

use crate::backend::{InMemoryBackend, PromoCodeRow, StorefrontBackend};
use crate::cart_store::{CartStorage, InMemoryCartStorage, SessionCartStore, SqliteCartStorage};
use crate::promo::PromoCodeValidator;

fn tee_shirt() -> NewLineItem {
    NewLineItem {
        product_id: ProductId::new(RecordId::new()),
        name: "Classic Tee".to_string(),
        unit_price_cents: 2_500,
        quantity: 2,
        size: Some("M".to_string()),
        color: Some("navy".to_string()),
    }
}

fn hoodie() -> NewLineItem {
    NewLineItem {
        product_id: ProductId::new(RecordId::new()),
        name: "Zip Hoodie".to_string(),
        unit_price_cents: 5_900,
        quantity: 1,
        size: Some("L".to_string()),
        color: None,
    }
}

#[tokio::test]
async fn sqlite_cart_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("carts.db");
    let session = SessionId::new();

    let id = {
        let storage = Arc::new(SqliteCartStorage::connect(&db_path).await.unwrap());
        let store = SessionCartStore::new(storage);
        store.add(session, tee_shirt()).await.unwrap()
    };

    // Fresh pool against the same file sees the same cart.
    let storage = Arc::new(SqliteCartStorage::connect(&db_path).await.unwrap());
    let store = SessionCartStore::new(storage);
    let cart = store.load(session).await;

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.items()[0].id, id);
    assert_eq!(cart.items()[0].name, "Classic Tee");
    assert_eq!(cart.items()[0].quantity, 2);
}

#[tokio::test]
async fn carts_are_scoped_per_session() {
    let storage = Arc::new(InMemoryCartStorage::new());
    let store = SessionCartStore::new(storage);

    let alice = SessionId::new();
    let bob = SessionId::new();
    store.add(alice, tee_shirt()).await.unwrap();

    assert_eq!(store.load(alice).await.len(), 1);
    assert!(store.load(bob).await.is_empty());
}

#[tokio::test]
async fn removing_the_last_item_clears_the_stored_row() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(
        SqliteCartStorage::connect(dir.path().join("carts.db"))
            .await
            .unwrap(),
    );
    let store = SessionCartStore::new(storage.clone());
    let session = SessionId::new();

    let id = store.add(session, hoodie()).await.unwrap();
    assert!(storage.load(session).await.unwrap().is_some());

    store.remove(session, id).await.unwrap();

    // No empty-array row is left behind.
    assert!(storage.load(session).await.unwrap().is_none());
    assert!(store.load(session).await.is_empty());
}

#[tokio::test]
async fn corrupt_stored_payload_degrades_to_the_default_cart() {
    let storage = Arc::new(InMemoryCartStorage::new());
    let session = SessionId::new();
    storage.save(session, "{not json").await.unwrap();

    let store = SessionCartStore::new(storage.clone());
    assert!(store.load(session).await.is_empty());

    // A configured default takes over instead of the empty cart.
    let starter = vec![LineItem {
        id: LineItemId::new(RecordId::new()),
        product_id: ProductId::new(RecordId::new()),
        name: "Starter Tote".to_string(),
        unit_price_cents: 1_200,
        quantity: 1,
        size: None,
        color: None,
    }];
    let store = SessionCartStore::with_default_items(storage, starter.clone());
    let cart = store.load(session).await;
    assert_eq!(cart.items(), starter.as_slice());
}

#[tokio::test]
async fn checkout_inserts_land_in_the_backend_and_redeem_the_promo() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed_promo(PromoCodeRow::active("SAVE20", 20.0));

    let storage = Arc::new(InMemoryCartStorage::new());
    let store = SessionCartStore::new(storage);
    let session = SessionId::new();
    store.add(session, tee_shirt()).await.unwrap();
    store.add(session, hoodie()).await.unwrap();

    // Validate the code the way the cart flow does.
    let validator = PromoCodeValidator::new(backend.clone());
    let code = PromoCode::parse("save20").unwrap();
    let validation = validator.validate(&code).await;
    let application = PromoApplication::from_validation(code, &validation).unwrap();

    let cart = store.load(session).await;
    let totals = compute_totals(
        cart.items(),
        application.discount(),
        ShippingMethod::Standard,
        &PricingConfig::default(),
    )
    .unwrap();

    let order_id = OrderId::new(RecordId::new());
    let handoff = build_order(
        session,
        order_id,
        cart.items(),
        totals,
        ShippingMethod::Standard,
        Some(application.code()),
        Utc::now(),
    )
    .unwrap();

    backend.insert_order(&handoff.order).await.unwrap();
    backend.insert_order_items(&handoff.items).await.unwrap();
    store.clear(session).await.unwrap();

    let record = backend.fetch_order(order_id).await.unwrap().unwrap();
    assert_eq!(record.order.total_cents, totals.total_cents);
    assert_eq!(record.order.promo_code.as_deref(), Some("SAVE20"));
    assert_eq!(record.items.len(), 2);
    assert_eq!(
        record.items.iter().map(|i| i.line_no).collect::<Vec<_>>(),
        vec![1, 2]
    );

    // The backend, not the cart flow, counts the redemption.
    assert_eq!(backend.promo_uses("SAVE20"), Some(1));
    assert!(store.load(session).await.is_empty());
}

#[tokio::test]
async fn fetch_order_returns_none_for_unknown_id() {
    let backend = InMemoryBackend::new();
    let found = backend
        .fetch_order(OrderId::new(RecordId::new()))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn tracking_events_come_back_oldest_first() {
    let backend = InMemoryBackend::new();
    let order_id = OrderId::new(RecordId::new());

    let event = |status: TrackingStatus, minute: u32| TrackingEvent {
        status,
        location: None,
        description: status.label().to_string(),
        tracking_number: None,
        courier_name: None,
        estimated_delivery: None,
        created_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, minute, 0).unwrap(),
    };

    backend.seed_tracking(
        order_id,
        vec![
            event(TrackingStatus::Shipped, 30),
            event(TrackingStatus::OrderConfirmed, 0),
            event(TrackingStatus::Processing, 10),
        ],
    );

    let events = backend.fetch_tracking_events(order_id).await.unwrap();
    let statuses: Vec<TrackingStatus> = events.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            TrackingStatus::OrderConfirmed,
            TrackingStatus::Processing,
            TrackingStatus::Shipped,
        ]
    );
}
