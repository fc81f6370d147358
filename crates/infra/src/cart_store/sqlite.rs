//! SQLite implementation of [`CartStorage`].

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};

use shopkit_core::SessionId;

use super::r#trait::{CartStorage, CartStorageError};

/// Cart storage backed by a single SQLite table.
///
/// One row per session: the serialized cart plus the time it was last
/// written. Writes are upserts so a session's row is created on first save.
#[derive(Debug, Clone)]
pub struct SqliteCartStorage {
    pool: SqlitePool,
}

impl SqliteCartStorage {
    /// Open (creating if missing) the cart database at `db_path` and ensure
    /// the carts table exists.
    pub async fn connect(db_path: impl AsRef<Path>) -> Result<Self, CartStorageError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CartStorageError::Connect(format!(
                        "failed to create cart db directory {parent:?}: {e}"
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            db_path.to_string_lossy()
        ))
        .map_err(|e| CartStorageError::Connect(format!("invalid cart db path {db_path:?}: {e}")))?
        .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| CartStorageError::Connect(format!("failed to open {db_path:?}: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS carts (
                session_id TEXT NOT NULL,
                data       TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (session_id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| CartStorageError::Connect(format!("failed to create carts table: {e}")))?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl CartStorage for SqliteCartStorage {
    async fn load(&self, session: SessionId) -> Result<Option<String>, CartStorageError> {
        let row = sqlx::query(
            r#"
            SELECT data
            FROM carts
            WHERE session_id = ?1
            "#,
        )
        .bind(session.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CartStorageError::Query(format!("failed to load cart: {e}")))?;

        match row {
            Some(row) => {
                let data: String = row
                    .try_get("data")
                    .map_err(|e| CartStorageError::Query(format!("failed to read cart row: {e}")))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: SessionId, payload: &str) -> Result<(), CartStorageError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO carts (session_id, data, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(session_id)
            DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session.to_string())
        .bind(payload)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| CartStorageError::Query(format!("failed to save cart: {e}")))?;

        Ok(())
    }

    async fn clear(&self, session: SessionId) -> Result<(), CartStorageError> {
        sqlx::query(
            r#"
            DELETE FROM carts
            WHERE session_id = ?1
            "#,
        )
        .bind(session.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| CartStorageError::Query(format!("failed to clear cart: {e}")))?;

        Ok(())
    }
}
