//! Distribution Lifecycle Controller
//!
//! Owns all mutable distribution state and enforces the state machine:
//! unopened -> open -> (active | expired), with pause orthogonal to that
//! axis. The controller orchestrates deposit-on-open, single-claim
//! enforcement, transfer-on-claim, and residue withdrawal, delegating set
//! membership to the merkle verifier and value movement to the custody
//! collaborator.

pub mod error;
pub mod roles;
pub mod service;

pub use error::DistributorError;
pub use roles::RoleSet;
pub use service::{DistributionParams, DistributionStatus, DistributorService};

/// Default claim window: 90 days
pub const DEFAULT_CLAIM_WINDOW_SECS: i64 = 90 * 24 * 60 * 60;
