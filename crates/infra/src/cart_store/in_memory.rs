use std::collections::HashMap;
use std::sync::RwLock;

use shopkit_core::SessionId;

use super::r#trait::{CartStorage, CartStorageError};

/// In-memory cart storage.
///
/// Intended for tests/dev. Carts live only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryCartStorage {
    entries: RwLock<HashMap<SessionId, String>>,
}

impl InMemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CartStorage for InMemoryCartStorage {
    async fn load(&self, session: SessionId) -> Result<Option<String>, CartStorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CartStorageError::Query("lock poisoned".to_string()))?;

        Ok(entries.get(&session).cloned())
    }

    async fn save(&self, session: SessionId, payload: &str) -> Result<(), CartStorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CartStorageError::Query("lock poisoned".to_string()))?;

        entries.insert(session, payload.to_string());
        Ok(())
    }

    async fn clear(&self, session: SessionId) -> Result<(), CartStorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CartStorageError::Query("lock poisoned".to_string()))?;

        entries.remove(&session);
        Ok(())
    }
}
