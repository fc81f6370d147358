//! Durable per-session cart storage.
//!
//! Storage implementations persist one opaque JSON payload per session
//! behind the [`CartStorage`] trait; [`SessionCartStore`] layers the cart
//! semantics (decode, mutate, write back) on top of whichever storage the
//! deployment picked.

pub mod in_memory;
pub mod session;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryCartStorage;
pub use session::{CartStoreError, SessionCartStore};
pub use sqlite::SqliteCartStorage;
pub use r#trait::{CartStorage, CartStorageError};
