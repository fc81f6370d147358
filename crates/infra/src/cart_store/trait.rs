use thiserror::Error;

use shopkit_core::SessionId;
use std::sync::Arc;

/// Cart storage operation error.
///
/// Infrastructure failures only; payload interpretation happens one layer up
/// in [`super::SessionCartStore`].
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("cart storage connection failed: {0}")]
    Connect(String),

    #[error("cart storage query failed: {0}")]
    Query(String),
}

/// Keyed storage of one serialized cart per session.
///
/// The payload is an opaque string to this trait; callers own its shape.
/// Implementations must treat a missing key as `Ok(None)`, not an error, and
/// must make `save` a full replacement of whatever was stored before.
#[async_trait::async_trait]
pub trait CartStorage: Send + Sync {
    /// Load the stored payload for a session, or `None` when nothing is stored.
    async fn load(&self, session: SessionId) -> Result<Option<String>, CartStorageError>;

    /// Store the payload for a session, replacing any previous one.
    async fn save(&self, session: SessionId, payload: &str) -> Result<(), CartStorageError>;

    /// Remove the stored payload for a session. Removing a missing key is not
    /// an error.
    async fn clear(&self, session: SessionId) -> Result<(), CartStorageError>;
}

#[async_trait::async_trait]
impl<S> CartStorage for Arc<S>
where
    S: CartStorage + ?Sized,
{
    async fn load(&self, session: SessionId) -> Result<Option<String>, CartStorageError> {
        (**self).load(session).await
    }

    async fn save(&self, session: SessionId, payload: &str) -> Result<(), CartStorageError> {
        (**self).save(session, payload).await
    }

    async fn clear(&self, session: SessionId) -> Result<(), CartStorageError> {
        (**self).clear(session).await
    }
}
