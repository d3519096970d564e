//! zDrop - One-Shot Merkle-Gated Value Distributor
//!
//! A one-time-funded, time-boxed distributor: the operating role deposits a
//! fixed pool exactly once against a published allocation commitment, each
//! eligible recipient withdraws its allotted share exactly once within the
//! claim window by proving membership in the allocation set, and the residue
//! reverts to the operating role after the window closes.
//!
//! ## Components
//!
//! - [`merkle`] - accumulator verifier: double-hashed leaves, sorted-pair
//!   inclusion proofs, plus the tree builder used for fixtures
//! - [`distributor`] - lifecycle controller: open / claim / sweep / pause
//!   state machine with reentrancy guarding and all-or-nothing claims
//! - [`custody`] - value custody collaborator (in-memory ledger provided)
//! - [`storage`] - claim records (in-memory and sqlite)
//! - [`api`] - REST surface for front-ends and operators

pub mod api;
pub mod clock;
pub mod common;
pub mod config;
pub mod custody;
pub mod distributor;
pub mod events;
pub mod logging;
pub mod merkle;
pub mod storage;
pub mod types;

// Re-exports: core surface
pub use common::{Result, ZDropError};
pub use config::{ConfigError, ZDropConfig};
pub use custody::{CustodyError, MemoryCustody, ValueCustody};
pub use distributor::{
    DistributionParams, DistributionStatus, DistributorError, DistributorService, RoleSet,
    DEFAULT_CLAIM_WINDOW_SECS,
};
pub use events::{DropEvent, EventSink, MemoryEventSink, TracingEventSink};
pub use merkle::{compute_leaf, verify, MerkleTree};
pub use storage::{ClaimRecord, ClaimStore, MemoryClaimStore, SqliteClaimStore, StorageError};
pub use types::{Digest32, Identity};
