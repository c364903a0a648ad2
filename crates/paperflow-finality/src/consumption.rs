//! State consumption record: prevents double-spend.
//!
//! Like a UTXO set: each [`StateRef`] can be consumed by exactly one
//! transaction. Consuming it again from a different transaction returns
//! [`PaperflowError::Rejected`] naming the earlier consumer. Re-presenting
//! the *same* transaction is idempotent, so a retried notarisation of an
//! already-notarised transaction succeeds.
//!
//! Unlike a settlement cache, entries are never evicted: forgetting a
//! consumption would re-open the state to double-spend.

use std::collections::HashMap;

use paperflow_types::{PaperflowError, Result, SecureHash, StateRef};

/// Which transaction consumed each state.
#[derive(Debug, Default)]
pub struct ConsumptionRecord {
    consumed: HashMap<StateRef, SecureHash>,
}

impl ConsumptionRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every input as consumed by `tx_id`, or none of them.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Rejected`] listing each input already
    /// consumed by a different transaction. Nothing is recorded in that case.
    pub fn consume(&mut self, inputs: &[StateRef], tx_id: SecureHash) -> Result<()> {
        let conflicts: Vec<String> = inputs
            .iter()
            .filter_map(|input| match self.consumed.get(input) {
                Some(by) if *by != tx_id => Some(format!("{input} already consumed by {by}")),
                _ => None,
            })
            .collect();
        if !conflicts.is_empty() {
            return Err(PaperflowError::Rejected {
                reason: format!("double spend in tx {tx_id}: {}", conflicts.join("; ")),
            });
        }

        for input in inputs {
            self.consumed.insert(*input, tx_id);
        }
        Ok(())
    }

    /// Whether `state_ref` has been consumed.
    #[must_use]
    pub fn is_consumed(&self, state_ref: &StateRef) -> bool {
        self.consumed.contains_key(state_ref)
    }

    /// The transaction that consumed `state_ref`, if any.
    #[must_use]
    pub fn consumed_by(&self, state_ref: &StateRef) -> Option<SecureHash> {
        self.consumed.get(state_ref).copied()
    }

    /// Number of consumed states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}
