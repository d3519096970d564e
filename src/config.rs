//! Environment-based Configuration for zDrop
//!
//! Loads all deployment parameters from environment variables. The expected
//! commitment and deposit amount are the operator-error defenses: `open`
//! only ever accepts these exact values, so a wrong or corrupted allocation
//! file cannot be published by mistake.
//!
//! # Required Environment Variables
//!
//! - `ZDROP_COMMITMENT` - hex-encoded 32-byte allocation root
//! - `ZDROP_DEPOSIT_AMOUNT` - exact pool amount required at open
//! - `ZDROP_OWNER` - hex-encoded owner identity (governance / emergency)
//! - `ZDROP_DAO` - hex-encoded dao identity (opens and sweeps)
//!
//! # Optional Settings
//!
//! - `ZDROP_CLAIM_WINDOW_SECS` - claim window duration (default: 90 days)
//! - `ZDROP_API_PORT` - REST API port (default: 3001)
//! - `ZDROP_DB_PATH` - sqlite path for claim records (default: in-memory)
//! - `ZDROP_LOG_LEVEL` - logging level (debug, info, warn, error)
//! - `ZDROP_LOG_JSON` - set to "1" for JSON log output

use std::env;
use thiserror::Error;

use crate::distributor::DEFAULT_CLAIM_WINDOW_SECS;
use crate::types::{parse_digest32, Digest32, Identity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct ZDropConfig {
    /// The only commitment root `open` will accept
    pub expected_commitment: Digest32,

    /// The exact deposit `open` must be funded with
    pub expected_deposit: u64,

    /// Claim window duration in seconds
    pub claim_window_secs: i64,

    /// Governance / emergency role
    pub owner: Identity,

    /// Operating role: opens and sweeps
    pub dao: Identity,

    /// REST API port
    pub api_port: u16,

    /// SQLite path for claim records; None = in-memory store
    pub db_path: Option<String>,

    /// Logging level
    pub log_level: String,

    /// JSON log output
    pub log_json: bool,
}

impl ZDropConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let expected_commitment = parse_digest32(&require("ZDROP_COMMITMENT")?)
            .map_err(|e| ConfigError::InvalidValue("ZDROP_COMMITMENT".to_string(), e.to_string()))?;

        let expected_deposit = require("ZDROP_DEPOSIT_AMOUNT")?.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("ZDROP_DEPOSIT_AMOUNT".to_string(), e.to_string())
        })?;

        let owner = Identity::from_hex(&require("ZDROP_OWNER")?)
            .map_err(|e| ConfigError::InvalidValue("ZDROP_OWNER".to_string(), e.to_string()))?;

        let dao = Identity::from_hex(&require("ZDROP_DAO")?)
            .map_err(|e| ConfigError::InvalidValue("ZDROP_DAO".to_string(), e.to_string()))?;

        let claim_window_secs = match env::var("ZDROP_CLAIM_WINDOW_SECS") {
            Ok(value) => value.parse::<i64>().map_err(|e| {
                ConfigError::InvalidValue("ZDROP_CLAIM_WINDOW_SECS".to_string(), e.to_string())
            })?,
            Err(_) => DEFAULT_CLAIM_WINDOW_SECS,
        };
        if claim_window_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "ZDROP_CLAIM_WINDOW_SECS".to_string(),
                "window must be positive".to_string(),
            ));
        }

        let api_port = match env::var("ZDROP_API_PORT") {
            Ok(value) => value.parse::<u16>().map_err(|e| {
                ConfigError::InvalidValue("ZDROP_API_PORT".to_string(), e.to_string())
            })?,
            Err(_) => 3001,
        };

        Ok(Self {
            expected_commitment,
            expected_deposit,
            claim_window_secs,
            owner,
            dao,
            api_port,
            db_path: env::var("ZDROP_DB_PATH").ok(),
            log_level: env::var("ZDROP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("ZDROP_LOG_JSON").map(|v| v == "1").unwrap_or(false),
        })
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-wide; each test uses its own variable names
    // through the parse helpers to stay isolated.

    #[test]
    fn test_require_missing() {
        let err = require("ZDROP_TEST_DOES_NOT_EXIST").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
        assert!(err.to_string().contains("ZDROP_TEST_DOES_NOT_EXIST"));
    }

    #[test]
    fn test_from_env_round_trip() {
        let commitment = hex::encode([5u8; 32]);
        env::set_var("ZDROP_COMMITMENT", &commitment);
        env::set_var("ZDROP_DEPOSIT_AMOUNT", "1000");
        env::set_var("ZDROP_OWNER", hex::encode([1u8; 32]));
        env::set_var("ZDROP_DAO", hex::encode([2u8; 32]));

        let config = ZDropConfig::from_env().unwrap();
        assert_eq!(config.expected_commitment, [5u8; 32]);
        assert_eq!(config.expected_deposit, 1000);
        assert_eq!(config.claim_window_secs, DEFAULT_CLAIM_WINDOW_SECS);
        assert_eq!(config.api_port, 3001);
        assert!(config.db_path.is_none());

        env::remove_var("ZDROP_COMMITMENT");
        env::remove_var("ZDROP_DEPOSIT_AMOUNT");
        env::remove_var("ZDROP_OWNER");
        env::remove_var("ZDROP_DAO");
    }
}
