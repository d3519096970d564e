//! Distributor Service
//!
//! One `DistributorService` instance is one distribution: funded exactly
//! once, claimable within a bounded window, swept by the operating role
//! afterwards. No global state - instantiate per deployment (or per test).
//!
//! Ordering discipline for `claim`: the claim record is written *before*
//! the external transfer, so a reentrant call triggered by the transfer
//! fails the already-claimed check even if the reentrancy guard were
//! absent. A rejected transfer rolls the record back - claim is
//! all-or-nothing.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::custody::ValueCustody;
use crate::events::{DropEvent, EventSink};
use crate::merkle;
use crate::storage::{ClaimStore, StorageError};
use crate::types::{digest_to_hex, Digest32, Identity, ZERO_DIGEST};

use super::error::DistributorError;
use super::roles::RoleSet;

/// Configuration-time invariants of one distribution.
///
/// The expected commitment and deposit are operator-error defenses: `open`
/// only ever accepts these exact values.
#[derive(Debug, Clone)]
pub struct DistributionParams {
    /// The only commitment root `open` will accept
    pub expected_commitment: Digest32,
    /// The exact deposit `open` must be funded with
    pub expected_deposit: u64,
    /// Claim window duration in seconds
    pub claim_window_secs: i64,
}

/// Mutable distribution state. Written exactly once by `open`, except for
/// the pause flag.
#[derive(Debug, Default)]
struct DistributionState {
    /// Zero until opened; set to the expected commitment exactly once
    commitment: Digest32,
    /// 0 until opened
    opened_at: i64,
    /// Deposited pool, reporting only - the live balance lives in custody
    pool: u64,
    paused: bool,
}

/// Read-only snapshot for the query surface
#[derive(Debug, Clone, Serialize)]
pub struct DistributionStatus {
    pub opened: bool,
    pub commitment: Option<String>,
    pub opened_at: i64,
    pub closes_at: i64,
    pub pool: u64,
    pub paused: bool,
    pub active: bool,
    pub time_remaining_secs: i64,
    pub claimed_count: u64,
    pub total_claimed: u64,
    pub remaining_balance: u64,
}

tokio::task_local! {
    /// Present while a guarded operation runs in this task. A nested call
    /// arriving through a custody callback runs in the same task, sees the
    /// marker, and is rejected; independent callers run in their own tasks
    /// and queue on the operation lock instead.
    static IN_GUARDED_OP: ();
}

/// True when called from inside a guarded operation on this call stack
fn reentered() -> bool {
    IN_GUARDED_OP.try_with(|_| ()).is_ok()
}

/// One-shot, time-boxed value distributor
pub struct DistributorService {
    params: DistributionParams,
    roles: RoleSet,
    state: Mutex<DistributionState>,
    /// Serializes the mutating operations; independent callers queue here
    op_lock: tokio::sync::Mutex<()>,
    custody: Arc<dyn ValueCustody>,
    claims: Arc<dyn ClaimStore>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl DistributorService {
    pub fn new(
        params: DistributionParams,
        roles: RoleSet,
        custody: Arc<dyn ValueCustody>,
        claims: Arc<dyn ClaimStore>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            params,
            roles,
            state: Mutex::new(DistributionState::default()),
            op_lock: tokio::sync::Mutex::new(()),
            custody,
            claims,
            clock,
            events,
        }
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn params(&self) -> &DistributionParams {
        &self.params
    }

    // Lock is never held across an await point; a poisoned lock still
    // yields the inner state.
    fn state(&self) -> MutexGuard<'_, DistributionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Fund and open the distribution. Operating role only; exactly once.
    pub async fn open(
        &self,
        caller: Identity,
        commitment: Digest32,
        amount: u64,
    ) -> Result<(), DistributorError> {
        if reentered() {
            return Err(DistributorError::ReentrantCall);
        }
        let _serial = self.op_lock.lock().await;
        IN_GUARDED_OP
            .scope((), self.open_locked(caller, commitment, amount))
            .await
    }

    async fn open_locked(
        &self,
        caller: Identity,
        commitment: Digest32,
        amount: u64,
    ) -> Result<(), DistributorError> {
        if !self.roles.is_dao(&caller) {
            return Err(DistributorError::NotAuthorized);
        }
        if commitment != self.params.expected_commitment {
            return Err(DistributorError::InvalidCommitment);
        }
        if self.state().commitment != ZERO_DIGEST {
            return Err(DistributorError::AlreadyOpened);
        }
        if amount != self.params.expected_deposit {
            return Err(DistributorError::InvalidDepositAmount {
                expected: self.params.expected_deposit,
                got: amount,
            });
        }

        // Take custody before recording state: a rejected deposit leaves
        // the distribution unopened.
        self.custody.deposit(amount).await?;

        let now = self.clock.now_unix();
        {
            let mut state = self.state();
            state.commitment = commitment;
            state.opened_at = now;
            state.pool = amount;
        }

        info!(
            target: "zdrop::distributor",
            commitment = %digest_to_hex(&commitment),
            amount,
            opened_at = now,
            "distribution opened"
        );
        self.events.emit(DropEvent::Opened {
            commitment: digest_to_hex(&commitment),
            amount,
            timestamp: now,
        });
        Ok(())
    }

    /// Claim the caller's allotment with a membership proof.
    pub async fn claim(
        &self,
        caller: Identity,
        amount: u64,
        proof: &[Digest32],
    ) -> Result<(), DistributorError> {
        if reentered() {
            return Err(DistributorError::ReentrantCall);
        }
        let _serial = self.op_lock.lock().await;
        IN_GUARDED_OP
            .scope((), self.claim_locked(caller, amount, proof))
            .await
    }

    async fn claim_locked(
        &self,
        caller: Identity,
        amount: u64,
        proof: &[Digest32],
    ) -> Result<(), DistributorError> {
        let (commitment, opened_at, paused) = {
            let state = self.state();
            (state.commitment, state.opened_at, state.paused)
        };

        if commitment == ZERO_DIGEST {
            return Err(DistributorError::NotOpen);
        }
        let now = self.clock.now_unix();
        if now >= opened_at + self.params.claim_window_secs {
            return Err(DistributorError::WindowExpired);
        }
        if paused {
            return Err(DistributorError::Paused);
        }
        if self.claims.is_claimed(&caller).await? {
            return Err(DistributorError::AlreadyClaimed);
        }

        let leaf = merkle::compute_leaf(&caller, amount);
        if !merkle::verify(proof, commitment, leaf) {
            return Err(DistributorError::InvalidProof);
        }

        // Effects before interactions: record the claim, then transfer.
        self.claims
            .mark_claimed(&caller, amount, now)
            .await
            .map_err(|e| match e {
                StorageError::Duplicate(_) => DistributorError::AlreadyClaimed,
                other => DistributorError::Storage(other),
            })?;

        if let Err(transfer_err) = self.custody.transfer(&caller, amount).await {
            // All-or-nothing: a rejected transfer leaves the identity
            // unclaimed. The transfer failure is what the caller sees;
            // a failed rollback is retried once and then logged, never
            // allowed to mask the transfer error.
            let mut rollback = self.claims.clear(&caller).await;
            if rollback.is_err() {
                rollback = self.claims.clear(&caller).await;
            }
            if let Err(clear_err) = rollback {
                error!(
                    target: "zdrop::distributor",
                    identity = %caller,
                    amount,
                    error = %clear_err,
                    "claim rollback failed, record stranded as claimed"
                );
            }
            warn!(
                target: "zdrop::distributor",
                identity = %caller,
                amount,
                error = %transfer_err,
                "claim transfer rejected, rolled back"
            );
            return Err(DistributorError::TransferFailed(transfer_err));
        }

        info!(
            target: "zdrop::distributor",
            identity = %caller,
            amount,
            "claim paid"
        );
        self.events.emit(DropEvent::Claimed {
            identity: caller,
            amount,
        });
        Ok(())
    }

    /// Sweep the remaining custodied balance to the operating role.
    ///
    /// Allowed once the window has expired, or immediately while paused
    /// (intentional emergency escape hatch). Returns the swept amount; a
    /// repeat call sweeps zero.
    pub async fn withdraw_remaining(&self, caller: Identity) -> Result<u64, DistributorError> {
        if reentered() {
            return Err(DistributorError::ReentrantCall);
        }
        let _serial = self.op_lock.lock().await;
        IN_GUARDED_OP
            .scope((), self.withdraw_locked(caller))
            .await
    }

    async fn withdraw_locked(&self, caller: Identity) -> Result<u64, DistributorError> {
        if !self.roles.is_dao(&caller) {
            return Err(DistributorError::NotAuthorized);
        }
        let (commitment, opened_at, paused) = {
            let state = self.state();
            (state.commitment, state.opened_at, state.paused)
        };
        if commitment == ZERO_DIGEST {
            return Err(DistributorError::NotOpen);
        }
        let now = self.clock.now_unix();
        if now < opened_at + self.params.claim_window_secs && !paused {
            return Err(DistributorError::WindowNotExpired);
        }

        let dao = self.roles.dao();
        let remaining = self.custody.balance().await;
        self.custody.transfer(&dao, remaining).await?;

        info!(
            target: "zdrop::distributor",
            destination = %dao,
            amount = remaining,
            "residue swept"
        );
        self.events.emit(DropEvent::Swept {
            destination: dao,
            amount: remaining,
        });
        Ok(remaining)
    }

    /// Suspend claims. Owner or dao.
    pub fn pause(&self, caller: Identity) -> Result<(), DistributorError> {
        if !self.roles.is_admin(&caller) {
            return Err(DistributorError::NotAuthorized);
        }
        self.state().paused = true;
        warn!(target: "zdrop::distributor", caller = %caller, "distribution paused");
        Ok(())
    }

    /// Resume claims. Owner or dao.
    pub fn unpause(&self, caller: Identity) -> Result<(), DistributorError> {
        if !self.roles.is_admin(&caller) {
            return Err(DistributorError::NotAuthorized);
        }
        self.state().paused = false;
        info!(target: "zdrop::distributor", caller = %caller, "distribution unpaused");
        Ok(())
    }

    /// Open and inside the claim window (pause does not affect this)
    pub fn is_active(&self) -> bool {
        let state = self.state();
        if state.commitment == ZERO_DIGEST {
            return false;
        }
        self.clock.now_unix() < state.opened_at + self.params.claim_window_secs
    }

    /// Seconds left in the claim window; 0 when unopened or expired
    pub fn time_remaining(&self) -> i64 {
        let state = self.state();
        if state.commitment == ZERO_DIGEST {
            return 0;
        }
        let deadline = state.opened_at + self.params.claim_window_secs;
        (deadline - self.clock.now_unix()).max(0)
    }

    /// Verify a proof without claiming. Before opening, verifies against
    /// the expected commitment so front-ends can validate prepared proofs.
    pub fn preview_verify(&self, identity: &Identity, amount: u64, proof: &[Digest32]) -> bool {
        let commitment = {
            let state = self.state();
            if state.commitment == ZERO_DIGEST {
                self.params.expected_commitment
            } else {
                state.commitment
            }
        };
        let leaf = merkle::compute_leaf(identity, amount);
        merkle::verify(proof, commitment, leaf)
    }

    /// Whether an identity has already claimed
    pub async fn is_claimed(&self, identity: &Identity) -> Result<bool, DistributorError> {
        Ok(self.claims.is_claimed(identity).await?)
    }

    /// Full read-only snapshot for the query surface
    pub async fn status(&self) -> Result<DistributionStatus, DistributorError> {
        let (commitment, opened_at, pool, paused) = {
            let state = self.state();
            (state.commitment, state.opened_at, state.pool, state.paused)
        };
        let opened = commitment != ZERO_DIGEST;
        let closes_at = if opened {
            opened_at + self.params.claim_window_secs
        } else {
            0
        };

        Ok(DistributionStatus {
            opened,
            commitment: opened.then(|| digest_to_hex(&commitment)),
            opened_at,
            closes_at,
            pool,
            paused,
            active: self.is_active(),
            time_remaining_secs: self.time_remaining(),
            claimed_count: self.claims.claimed_count().await?,
            total_claimed: self.claims.total_claimed().await?,
            remaining_balance: self.custody.balance().await,
        })
    }
}
