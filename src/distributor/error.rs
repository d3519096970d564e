//! Distributor Error Taxonomy
//!
//! Every failure of a lifecycle operation is one named condition. Mutating
//! operations are all-or-nothing: on any of these errors no state write or
//! value movement survives.

use thiserror::Error;

use crate::custody::CustodyError;
use crate::storage::StorageError;

/// Lifecycle controller errors
#[derive(Debug, Error)]
pub enum DistributorError {
    // Authorization
    #[error("caller is not authorized for this operation")]
    NotAuthorized,

    // Lifecycle phase
    #[error("distribution has not been opened")]
    NotOpen,

    #[error("distribution has already been opened")]
    AlreadyOpened,

    #[error("claim window has expired")]
    WindowExpired,

    #[error("claim window has not expired yet")]
    WindowNotExpired,

    #[error("claims are paused")]
    Paused,

    // Opening validation
    #[error("commitment does not match the expected allocation root")]
    InvalidCommitment,

    #[error("deposit amount {got} does not match the required {expected}")]
    InvalidDepositAmount { expected: u64, got: u64 },

    // Claim validation
    #[error("membership proof verification failed")]
    InvalidProof,

    #[error("identity has already claimed its allotment")]
    AlreadyClaimed,

    // Collaborators
    #[error("value transfer failed: {0}")]
    TransferFailed(#[from] CustodyError),

    #[error("reentrant call rejected")]
    ReentrantCall,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl DistributorError {
    /// Stable error code for API responses and structured logs
    pub fn error_code(&self) -> &'static str {
        match self {
            DistributorError::NotAuthorized => "NOT_AUTHORIZED",
            DistributorError::NotOpen => "NOT_OPEN",
            DistributorError::AlreadyOpened => "ALREADY_OPENED",
            DistributorError::WindowExpired => "WINDOW_EXPIRED",
            DistributorError::WindowNotExpired => "WINDOW_NOT_EXPIRED",
            DistributorError::Paused => "PAUSED",
            DistributorError::InvalidCommitment => "INVALID_COMMITMENT",
            DistributorError::InvalidDepositAmount { .. } => "INVALID_DEPOSIT_AMOUNT",
            DistributorError::InvalidProof => "INVALID_PROOF",
            DistributorError::AlreadyClaimed => "ALREADY_CLAIMED",
            DistributorError::TransferFailed(_) => "TRANSFER_FAILED",
            DistributorError::ReentrantCall => "REENTRANT_CALL",
            DistributorError::Storage(_) => "STORAGE_ERROR",
        }
    }
}
