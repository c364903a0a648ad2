//! Notary: certifies that a transaction's inputs are unconsumed.
//!
//! Before signing, the notary checks, in order:
//! 1. The transaction names this notary
//! 2. Its time-window (if any) contains the notary's current time
//! 3. Every required signature is present and verifies
//! 4. No input was consumed by another transaction (atomic check-and-mark)
//!
//! Any failure is [`PaperflowError::Rejected`] and leaves the consumption
//! record untouched.

use std::sync::{Arc, Mutex};

use paperflow_builder::KeyStore;
use paperflow_types::{
    Clock, PaperflowError, Party, Result, SignedTransaction, StateRef, TransactionSignature,
};

use crate::consumption::ConsumptionRecord;

/// A single-node notary with its own consumption record.
pub struct Notary {
    party: Party,
    keys: Arc<KeyStore>,
    clock: Arc<dyn Clock>,
    consumed: Mutex<ConsumptionRecord>,
}

impl Notary {
    /// Create a notary acting as `party`. `keys` must hold its private key.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Configuration`] if the key is missing.
    pub fn new(party: Party, keys: Arc<KeyStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        if !keys.holds(&party) {
            return Err(PaperflowError::Configuration(format!(
                "notary {party} has no private key in the key store"
            )));
        }
        Ok(Self {
            party,
            keys,
            clock,
            consumed: Mutex::new(ConsumptionRecord::new()),
        })
    }

    #[must_use]
    pub fn party(&self) -> &Party {
        &self.party
    }

    /// Validate and sign `stx`, consuming its inputs.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Rejected`] describing the failed check.
    pub fn notarise(&self, stx: &SignedTransaction) -> Result<TransactionSignature> {
        let proposal = stx.proposal();
        let tx_id = stx.id();

        if proposal.notary != self.party {
            return Err(reject(format!(
                "tx {tx_id} names notary {}, not {}",
                proposal.notary, self.party
            )));
        }

        let now = self.clock.now();
        if let Some(window) = &proposal.time_window {
            if !window.contains(now) {
                return Err(reject(format!(
                    "tx {tx_id} time-window {window} does not contain {now}"
                )));
            }
        }

        stx.verify_signatures()
            .map_err(|e| reject(format!("tx {tx_id}: {e}")))?;

        self.consumed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .consume(&proposal.inputs, tx_id)?;

        let signature = self
            .keys
            .sign_id(&tx_id, &self.party)
            .map_err(|e| PaperflowError::Internal(format!("notary failed to sign: {e}")))?;

        tracing::info!(
            tx = %tx_id.short(),
            kind = %proposal.kind,
            inputs = proposal.inputs.len(),
            notary = %self.party,
            "transaction notarised"
        );
        Ok(signature)
    }

    /// Whether this notary has seen `state_ref` consumed.
    #[must_use]
    pub fn is_consumed(&self, state_ref: &StateRef) -> bool {
        self.consumed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_consumed(state_ref)
    }
}

fn reject(reason: String) -> PaperflowError {
    tracing::warn!(%reason, "notary rejected transaction");
    PaperflowError::Rejected { reason }
}
