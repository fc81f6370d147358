//! Session-scoped cart semantics over a [`CartStorage`].

use std::sync::Arc;

use thiserror::Error;

use shopkit_cart::{Cart, LineItem, LineItemId, NewLineItem};
use shopkit_core::{DomainError, SessionId};

use super::r#trait::{CartStorage, CartStorageError};

/// Error from a cart store mutation.
///
/// Loads never produce this: a cart that cannot be read falls back to the
/// configured default instead of failing the request.
#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] CartStorageError),
}

/// Per-session cart store with write-through persistence.
///
/// Every mutation loads the session's cart, applies the change in memory, and
/// writes the full item list back; an emptied cart clears the stored row
/// instead of persisting `[]`. Unreadable stored payloads (storage failure,
/// corrupt JSON, items that no longer satisfy cart invariants) degrade to the
/// configured default item list with a warning rather than wedging the
/// session.
///
/// This type does no locking of its own. Callers that need
/// read-modify-write atomicity per session serialize access themselves.
pub struct SessionCartStore {
    storage: Arc<dyn CartStorage>,
    default_items: Vec<LineItem>,
}

impl SessionCartStore {
    pub fn new(storage: Arc<dyn CartStorage>) -> Self {
        Self {
            storage,
            default_items: Vec::new(),
        }
    }

    /// Use `items` as the cart a session starts from (and falls back to when
    /// its stored cart cannot be read).
    pub fn with_default_items(storage: Arc<dyn CartStorage>, items: Vec<LineItem>) -> Self {
        Self {
            storage,
            default_items: items,
        }
    }

    /// Load the session's cart.
    ///
    /// Total: any failure along the way (storage, JSON decode, invariant
    /// check) logs a warning and yields the default cart.
    pub async fn load(&self, session: SessionId) -> Cart {
        let payload = match self.storage.load(session).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%session, error = %err, "cart load failed, using default cart");
                return self.default_cart();
            }
        };

        let Some(payload) = payload else {
            return self.default_cart();
        };

        let items: Vec<LineItem> = match serde_json::from_str(&payload) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(%session, error = %err, "stored cart is not valid JSON, using default cart");
                return self.default_cart();
            }
        };

        match Cart::try_from_items(items) {
            Ok(cart) => cart,
            Err(err) => {
                tracing::warn!(%session, error = %err, "stored cart violates cart rules, using default cart");
                self.default_cart()
            }
        }
    }

    /// Add an item (merging with a matching line), persisting the result.
    pub async fn add(
        &self,
        session: SessionId,
        new_item: NewLineItem,
    ) -> Result<LineItemId, CartStoreError> {
        let mut cart = self.load(session).await;
        let id = cart.add(new_item)?;
        self.persist(session, &cart).await?;
        Ok(id)
    }

    /// Set a line's quantity, persisting the result.
    pub async fn set_quantity(
        &self,
        session: SessionId,
        id: LineItemId,
        quantity: u32,
    ) -> Result<(), CartStoreError> {
        let mut cart = self.load(session).await;
        cart.set_quantity(id, quantity)?;
        self.persist(session, &cart).await?;
        Ok(())
    }

    /// Remove a line, persisting the result.
    pub async fn remove(&self, session: SessionId, id: LineItemId) -> Result<(), CartStoreError> {
        let mut cart = self.load(session).await;
        cart.remove(id)?;
        self.persist(session, &cart).await?;
        Ok(())
    }

    /// Empty the session's cart.
    pub async fn clear(&self, session: SessionId) -> Result<(), CartStoreError> {
        self.storage.clear(session).await?;
        Ok(())
    }

    async fn persist(&self, session: SessionId, cart: &Cart) -> Result<(), CartStorageError> {
        if cart.is_empty() {
            return self.storage.clear(session).await;
        }

        let payload = serde_json::to_string(cart.items()).map_err(|e| {
            CartStorageError::Query(format!("failed to serialize cart items: {e}"))
        })?;
        self.storage.save(session, &payload).await
    }

    fn default_cart(&self) -> Cart {
        match Cart::try_from_items(self.default_items.clone()) {
            Ok(cart) => cart,
            Err(err) => {
                tracing::warn!(error = %err, "default cart items are invalid, starting empty");
                Cart::new()
            }
        }
    }
}
