//! Ledger participants.
//!
//! A [`Party`] is a well-known identity: a legal name bound to an ed25519
//! public key. Parties compare by both, so two parties that share a name but
//! not a key are different identities.

use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::{OpaqueBytes, PaperflowError, Result};

/// The raw ed25519 public key (32 bytes) a party signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PartyKey(pub [u8; 32]);

impl PartyKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decode into a verifying key.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Signing`] if the bytes are not a valid curve point.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).map_err(|e| PaperflowError::Signing {
            reason: format!("malformed public key {self}: {e}"),
        })
    }
}

impl From<VerifyingKey> for PartyKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl fmt::Display for PartyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key:{}", hex::encode(&self.0[..8]))
    }
}

/// A participant on the ledger: issuer, owner or notary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Party {
    /// Legal name, e.g. `"O=Bank of Paper, L=London, C=GB"`.
    pub name: String,
    /// The key this party signs with.
    pub owning_key: PartyKey,
}

impl Party {
    #[must_use]
    pub fn new(name: impl Into<String>, owning_key: PartyKey) -> Self {
        Self {
            name: name.into(),
            owning_key,
        }
    }

    /// Pair this party with an issuer reference.
    #[must_use]
    pub fn reference(&self, reference: OpaqueBytes) -> PartyAndReference {
        PartyAndReference {
            party: self.clone(),
            reference,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Dummy party for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Party {
    /// A party with a random (not necessarily on-curve) key.
    pub fn dummy(name: &str) -> Self {
        Self::new(name, PartyKey(rand::random::<[u8; 32]>()))
    }
}

/// A party plus an opaque reference distinguishing its independent issuances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PartyAndReference {
    pub party: Party,
    pub reference: OpaqueBytes,
}

impl fmt::Display for PartyAndReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.party, self.reference)
    }
}
