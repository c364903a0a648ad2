//! Ed25519 key store: the local signing service.
//!
//! Holds the private keys of the identities this node acts for. Signatures
//! cover the proposal id (SHA-256 of its canonical encoding), so they are
//! deterministic for a given key and proposal.

use std::collections::HashMap;
use std::sync::RwLock;

use ed25519_dalek::{Signer, SigningKey};
use paperflow_types::{
    PaperflowError, Party, PartyKey, Result, SecureHash, TransactionProposal, TransactionSignature,
};
use rand::rngs::OsRng;

use crate::traits::SigningService;

/// Private keys indexed by their public half.
#[derive(Default)]
pub struct KeyStore {
    keys: RwLock<HashMap<PartyKey, SigningKey>>,
}

impl KeyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh key pair and return the party it identifies.
    pub fn generate_identity(&self, name: impl Into<String>) -> Party {
        self.insert(name, SigningKey::generate(&mut OsRng))
    }

    /// Adopt an existing key pair.
    pub fn insert(&self, name: impl Into<String>, key: SigningKey) -> Party {
        let party = Party::new(name, key.verifying_key().into());
        self.keys
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(party.owning_key, key);
        party
    }

    /// Whether the private key for `party` is held here.
    #[must_use]
    pub fn holds(&self, party: &Party) -> bool {
        self.keys
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(&party.owning_key)
    }

    /// Sign an arbitrary transaction id as `party`.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Signing`] if the key is not held.
    pub fn sign_id(&self, tx_id: &SecureHash, party: &Party) -> Result<TransactionSignature> {
        let keys = self
            .keys
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let key = keys
            .get(&party.owning_key)
            .ok_or_else(|| PaperflowError::Signing {
                reason: format!("no private key for {party} ({})", party.owning_key),
            })?;
        Ok(TransactionSignature {
            by: party.owning_key,
            bytes: key.sign(tx_id.as_bytes()).to_bytes().to_vec(),
        })
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .keys
            .read()
            .map(|k| k.len())
            .unwrap_or_default();
        f.debug_struct("KeyStore").field("keys", &count).finish()
    }
}

impl SigningService for KeyStore {
    fn sign(&self, proposal: &TransactionProposal, party: &Party) -> Result<TransactionSignature> {
        self.sign_id(&proposal.id(), party)
    }
}
