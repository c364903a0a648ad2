//! Identifiers used throughout Paperflow.
//!
//! Content identifiers ([`SecureHash`]) are SHA-256 digests. Flow runs use
//! UUIDv7 so log lines sort by start time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{PaperflowError, Result};

// ---------------------------------------------------------------------------
// SecureHash
// ---------------------------------------------------------------------------

/// A SHA-256 digest. Identifies transactions and attachment content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SecureHash(pub [u8; 32]);

impl SecureHash {
    /// Hash arbitrary bytes.
    #[must_use]
    pub fn sha256(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// Parse a 64-character hex string (either case).
    ///
    /// # Errors
    /// Returns [`PaperflowError::Configuration`] for bad hex or wrong length.
    pub fn parse(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| PaperflowError::Configuration(format!("invalid hash {hex_str:?}: {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            PaperflowError::Configuration(format!("hash must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First four bytes, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode_upper(&self.0[..4])
    }
}

impl FromStr for SecureHash {
    type Err = PaperflowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SecureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

// ---------------------------------------------------------------------------
// FlowId
// ---------------------------------------------------------------------------

/// Identifier for one run of a coordinator. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FlowId(pub Uuid);

impl FlowId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flow:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
