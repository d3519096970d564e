//! SQLite Claim Store
//!
//! Durable claim records that survive service restarts. Uses connection
//! pooling via r2d2 for concurrent access.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use crate::types::Identity;

use super::{ClaimRecord, ClaimStore, StorageError, StorageResult};

/// SQLite-backed claim store with connection pooling
pub struct SqliteClaimStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteClaimStore {
    /// Create a new store with the given database path
    ///
    /// Creates the database file and runs migrations if needed.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    /// Get a connection from the pool
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool
            .get()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS claims (
                identity TEXT PRIMARY KEY,
                amount INTEGER NOT NULL,
                claimed_at INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ClaimStore for SqliteClaimStore {
    async fn is_claimed(&self, identity: &Identity) -> StorageResult<bool> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM claims WHERE identity = ?1",
                params![identity.to_hex()],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    async fn mark_claimed(
        &self,
        identity: &Identity,
        amount: u64,
        claimed_at: i64,
    ) -> StorageResult<()> {
        let conn = self.conn()?;
        let result = conn.execute(
            "INSERT INTO claims (identity, amount, claimed_at) VALUES (?1, ?2, ?3)",
            params![identity.to_hex(), amount as i64, claimed_at],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::Duplicate(identity.to_hex()))
            }
            Err(e) => Err(StorageError::Database(e.to_string())),
        }
    }

    async fn clear(&self, identity: &Identity) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM claims WHERE identity = ?1",
            params![identity.to_hex()],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, identity: &Identity) -> StorageResult<Option<ClaimRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT identity, amount, claimed_at FROM claims WHERE identity = ?1",
                params![identity.to_hex()],
                |row| {
                    let identity_hex: String = row.get(0)?;
                    let amount: i64 = row.get(1)?;
                    let claimed_at: i64 = row.get(2)?;
                    Ok((identity_hex, amount, claimed_at))
                },
            )
            .optional()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        match row {
            None => Ok(None),
            Some((identity_hex, amount, claimed_at)) => {
                let identity = Identity::from_hex(&identity_hex)
                    .map_err(|e| StorageError::Database(e.to_string()))?;
                Ok(Some(ClaimRecord {
                    identity,
                    amount: amount as u64,
                    claimed_at,
                }))
            }
        }
    }

    async fn claimed_count(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM claims", [], |row| row.get(0))
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(count as u64)
    }

    async fn total_claimed(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let total: i64 = conn
            .query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM claims",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(total as u64)
    }
}
