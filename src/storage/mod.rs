//! Claim Record Storage
//!
//! Defines the abstract claim-record store used by the lifecycle controller.
//! One record per identity, created on first successful claim, never reset
//! except to roll back a claim whose value transfer was rejected.
//!
//! Implementations:
//! - `SqliteClaimStore` - durable storage with connection pooling
//! - `MemoryClaimStore` - in-memory storage for testing and development

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::types::Identity;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryClaimStore;
pub use sqlite::SqliteClaimStore;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One successful claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRecord {
    pub identity: Identity,
    pub amount: u64,
    pub claimed_at: i64,
}

/// Claim record store interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Whether this identity has already claimed
    async fn is_claimed(&self, identity: &Identity) -> StorageResult<bool>;

    /// Record a successful claim. Fails with `Duplicate` if a record exists.
    async fn mark_claimed(
        &self,
        identity: &Identity,
        amount: u64,
        claimed_at: i64,
    ) -> StorageResult<()>;

    /// Remove a record. Rollback path only - a claim whose transfer was
    /// rejected must leave the identity unclaimed.
    async fn clear(&self, identity: &Identity) -> StorageResult<()>;

    /// Fetch one record
    async fn get(&self, identity: &Identity) -> StorageResult<Option<ClaimRecord>>;

    /// Number of identities that have claimed
    async fn claimed_count(&self) -> StorageResult<u64>;

    /// Sum of all claimed amounts
    async fn total_claimed(&self) -> StorageResult<u64>;
}
