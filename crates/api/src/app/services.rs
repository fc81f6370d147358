use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use shopkit_core::SessionId;
use shopkit_infra::backend::{HttpBackend, InMemoryBackend, StorefrontBackend};
use shopkit_infra::cart_store::{
    CartStorage, InMemoryCartStorage, SessionCartStore, SqliteCartStorage,
};
use shopkit_infra::promo::PromoCodeValidator;
use shopkit_pricing::PricingConfig;
use shopkit_promos::PromoApplication;

/// Everything the handlers need, built once at startup and shared via
/// `Extension<Arc<AppServices>>`.
pub struct AppServices {
    backend: Arc<dyn StorefrontBackend>,
    carts: SessionCartStore,
    validator: PromoCodeValidator,
    pricing: PricingConfig,
    /// At most one applied code per session; applying a new one replaces it.
    promo_slots: RwLock<HashMap<SessionId, PromoApplication>>,
    /// One mutation lock per session. Handlers hold it across the whole
    /// read-modify-write (and across checkout), which is what makes the
    /// full-array cart persistence safe from lost updates.
    session_locks: tokio::sync::Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppServices {
    pub fn new(
        backend: Arc<dyn StorefrontBackend>,
        storage: Arc<dyn CartStorage>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            backend: backend.clone(),
            carts: SessionCartStore::new(storage),
            validator: PromoCodeValidator::new(backend),
            pricing,
            promo_slots: RwLock::new(HashMap::new()),
            session_locks: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn StorefrontBackend> {
        &self.backend
    }

    pub fn carts(&self) -> &SessionCartStore {
        &self.carts
    }

    pub fn validator(&self) -> &PromoCodeValidator {
        &self.validator
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Lock guarding all mutations for one session.
    pub async fn session_lock(&self, session: SessionId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks.entry(session).or_default().clone()
    }

    pub fn applied_promo(&self, session: SessionId) -> Option<PromoApplication> {
        self.promo_slots.read().unwrap().get(&session).cloned()
    }

    pub fn apply_promo(&self, session: SessionId, application: PromoApplication) {
        self.promo_slots.write().unwrap().insert(session, application);
    }

    pub fn clear_promo(&self, session: SessionId) {
        self.promo_slots.write().unwrap().remove(&session);
    }

    /// Drop a session's promo slot and lock entry once its cart is gone, so
    /// finished sessions do not pin map entries for the process lifetime.
    ///
    /// A caller still holding the lock's guard is unaffected (the `Arc`
    /// keeps the mutex alive), but must release only after its last cart
    /// write: the next request for the session gets a fresh lock.
    pub async fn release_session(&self, session: SessionId) {
        self.promo_slots.write().unwrap().remove(&session);
        self.session_locks.lock().await.remove(&session);
    }
}

pub async fn build_services() -> AppServices {
    let backend = build_backend();
    let storage = build_cart_storage().await;

    AppServices::new(backend, storage, PricingConfig::from_env())
}

fn build_backend() -> Arc<dyn StorefrontBackend> {
    let use_remote = std::env::var("USE_REMOTE_BACKEND")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_remote {
        match (
            std::env::var("BACKEND_URL"),
            std::env::var("BACKEND_API_KEY"),
        ) {
            (Ok(url), Ok(key)) => {
                tracing::info!(url = %url, "using remote storefront backend");
                return Arc::new(HttpBackend::new(url, key));
            }
            _ => {
                tracing::warn!(
                    "USE_REMOTE_BACKEND=true but BACKEND_URL/BACKEND_API_KEY not set, falling back to in-memory backend"
                );
            }
        }
    }

    Arc::new(InMemoryBackend::new())
}

async fn build_cart_storage() -> Arc<dyn CartStorage> {
    match std::env::var("CART_DB_PATH") {
        Ok(path) => match SqliteCartStorage::connect(&path).await {
            Ok(storage) => {
                tracing::info!(path = %path, "cart persistence: sqlite");
                Arc::new(storage)
            }
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "failed to open cart db, falling back to in-memory carts");
                Arc::new(InMemoryCartStorage::new())
            }
        },
        Err(_) => {
            tracing::info!("CART_DB_PATH not set, carts are in-memory only");
            Arc::new(InMemoryCartStorage::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use shopkit_pricing::DiscountPercent;
    use shopkit_promos::{PromoCode, PromoValidation};

    fn services() -> AppServices {
        AppServices::new(
            Arc::new(InMemoryBackend::new()),
            Arc::new(InMemoryCartStorage::new()),
            PricingConfig::default(),
        )
    }

    fn applied(code: &str, percent: f64) -> PromoApplication {
        let code = PromoCode::parse(code).unwrap();
        let validation = PromoValidation::valid(DiscountPercent::from_percent(percent), "ok");
        PromoApplication::from_validation(code, &validation).unwrap()
    }

    #[tokio::test]
    async fn releasing_a_session_drops_its_promo_slot_and_lock_entry() {
        let services = services();
        let session = SessionId::new();

        services.session_lock(session).await;
        services.apply_promo(session, applied("SAVE20", 20.0));
        assert!(services.applied_promo(session).is_some());

        services.release_session(session).await;

        assert!(services.applied_promo(session).is_none());
        assert!(services.promo_slots.read().unwrap().is_empty());
        assert!(services.session_locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn a_release_leaves_a_held_guard_valid_and_mints_a_fresh_lock() {
        let services = services();
        let session = SessionId::new();

        let lock = services.session_lock(session).await;
        let guard = lock.lock().await;

        services.release_session(session).await;

        let relocked = services.session_lock(session).await;
        assert!(!Arc::ptr_eq(&lock, &relocked));
        drop(guard);
    }

    #[tokio::test]
    async fn releasing_an_untouched_session_is_a_no_op() {
        let services = services();
        services.release_session(SessionId::new()).await;
        assert!(services.promo_slots.read().unwrap().is_empty());
    }
}
