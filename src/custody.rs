//! Value Custody Collaborator
//!
//! The distributor never tracks its live balance itself - it holds value
//! through a custody rail that can receive the opening deposit, push exact
//! amounts to recipients, and report the remaining custodied balance.
//! A push can be rejected by the destination; the distributor treats that
//! as observable failure and rolls the claim back.
//!
//! `MemoryCustody` is the in-process ledger used for tests, the demo mode,
//! and development deployments. A production rail implements the same trait.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::Identity;

/// Custody errors
#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("deposit rejected: {0}")]
    DepositRejected(String),

    #[error("transfer rejected by destination {0}")]
    TransferRejected(Identity),

    #[error("insufficient custodied balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
}

/// Fungible-value custody interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ValueCustody: Send + Sync {
    /// Take custody of `amount` units (the opening deposit)
    async fn deposit(&self, amount: u64) -> Result<(), CustodyError>;

    /// Push `amount` units to `to`. The destination may reject.
    async fn transfer(&self, to: &Identity, amount: u64) -> Result<(), CustodyError>;

    /// Remaining custodied balance
    async fn balance(&self) -> u64;
}

#[derive(Default)]
struct Ledger {
    vault: u64,
    accounts: HashMap<Identity, u64>,
    rejecting: HashSet<Identity>,
}

/// In-memory custody ledger
#[derive(Clone, Default)]
pub struct MemoryCustody {
    ledger: Arc<RwLock<Ledger>>,
}

impl MemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance credited to an external identity
    pub async fn balance_of(&self, identity: &Identity) -> u64 {
        let ledger = self.ledger.read().await;
        ledger.accounts.get(identity).copied().unwrap_or(0)
    }

    /// Mark a destination as rejecting all incoming transfers
    pub async fn set_rejecting(&self, identity: Identity, rejecting: bool) {
        let mut ledger = self.ledger.write().await;
        if rejecting {
            ledger.rejecting.insert(identity);
        } else {
            ledger.rejecting.remove(&identity);
        }
    }
}

#[async_trait]
impl ValueCustody for MemoryCustody {
    async fn deposit(&self, amount: u64) -> Result<(), CustodyError> {
        let mut ledger = self.ledger.write().await;
        ledger.vault = ledger
            .vault
            .checked_add(amount)
            .ok_or_else(|| CustodyError::DepositRejected("balance overflow".to_string()))?;
        Ok(())
    }

    async fn transfer(&self, to: &Identity, amount: u64) -> Result<(), CustodyError> {
        let mut ledger = self.ledger.write().await;
        if ledger.rejecting.contains(to) {
            return Err(CustodyError::TransferRejected(*to));
        }
        if ledger.vault < amount {
            return Err(CustodyError::InsufficientBalance {
                have: ledger.vault,
                need: amount,
            });
        }
        ledger.vault -= amount;
        *ledger.accounts.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    async fn balance(&self) -> u64 {
        self.ledger.read().await.vault
    }
}
