//! In-Memory Claim Store
//!
//! Thread-safe claim records for testing and development. Data is lost
//! when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::Identity;

use super::{ClaimRecord, ClaimStore, StorageError, StorageResult};

/// In-memory claim record store
#[derive(Clone, Default)]
pub struct MemoryClaimStore {
    records: Arc<RwLock<HashMap<Identity, ClaimRecord>>>,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClaimStore for MemoryClaimStore {
    async fn is_claimed(&self, identity: &Identity) -> StorageResult<bool> {
        Ok(self.records.read().await.contains_key(identity))
    }

    async fn mark_claimed(
        &self,
        identity: &Identity,
        amount: u64,
        claimed_at: i64,
    ) -> StorageResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(identity) {
            return Err(StorageError::Duplicate(identity.to_hex()));
        }
        records.insert(
            *identity,
            ClaimRecord {
                identity: *identity,
                amount,
                claimed_at,
            },
        );
        Ok(())
    }

    async fn clear(&self, identity: &Identity) -> StorageResult<()> {
        self.records.write().await.remove(identity);
        Ok(())
    }

    async fn get(&self, identity: &Identity) -> StorageResult<Option<ClaimRecord>> {
        Ok(self.records.read().await.get(identity).cloned())
    }

    async fn claimed_count(&self) -> StorageResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn total_claimed(&self) -> StorageResult<u64> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .map(|record| record.amount)
            .sum())
    }
}
