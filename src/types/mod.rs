//! Shared Types for zDrop
//!
//! Defines the identity and digest types used across the distributor,
//! the merkle verifier, storage, and the API layer.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// 32-byte digest (merkle leaves, interior nodes, and the commitment root)
pub type Digest32 = [u8; 32];

/// The all-zero digest, used as the "commitment not yet set" sentinel
pub const ZERO_DIGEST: Digest32 = [0u8; 32];

/// Errors produced when parsing identities or digests from hex
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Recipient / role identity: an opaque 32-byte value.
///
/// On the wire (API, config, sqlite) identities are lowercase hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; 32]);

impl Identity {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a 64-character hex string
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = parse_digest32(s)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Identity {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Identity::from_hex(&s).map_err(DeError::custom)
    }
}

/// Parse a 32-byte digest from a hex string (with or without 0x prefix)
pub fn parse_digest32(s: &str) -> Result<Digest32, TypeError> {
    let s = s.trim_start_matches("0x");
    let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(TypeError::InvalidLength(bytes.len()));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Hex-encode a 32-byte digest for display / API payloads
pub fn digest_to_hex(digest: &Digest32) -> String {
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_hex_round_trip() {
        let id = Identity::new([0xab; 32]);
        let hex = id.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Identity::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn test_identity_rejects_bad_input() {
        assert!(matches!(
            Identity::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
        assert!(matches!(
            Identity::from_hex("abcd"),
            Err(TypeError::InvalidLength(2))
        ));
    }

    #[test]
    fn test_parse_digest_strips_prefix() {
        let hex = format!("0x{}", hex::encode([7u8; 32]));
        assert_eq!(parse_digest32(&hex).unwrap(), [7u8; 32]);
    }

    #[test]
    fn test_identity_serde_as_hex_string() {
        let id = Identity::new([1u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
