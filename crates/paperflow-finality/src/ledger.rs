//! In-memory ledger vault: one participant's view of finalised transactions.
//!
//! Recording a finalised transaction stores it and marks its inputs consumed,
//! so [`StateResolver::resolve`] only ever returns unconsumed outputs.

use std::collections::HashMap;
use std::sync::RwLock;

use paperflow_builder::StateResolver;
use paperflow_types::{FinalizedTransaction, InstrumentState, Party, Result, SecureHash, StateRef};

use crate::consumption::ConsumptionRecord;

#[derive(Debug, Default)]
struct VaultInner {
    transactions: HashMap<SecureHash, FinalizedTransaction>,
    consumed: ConsumptionRecord,
}

/// A participant's vault.
#[derive(Debug)]
pub struct InMemoryLedger {
    owner: Party,
    inner: RwLock<VaultInner>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new(owner: Party) -> Self {
        Self {
            owner,
            inner: RwLock::new(VaultInner::default()),
        }
    }

    /// The party this vault belongs to.
    #[must_use]
    pub fn owner(&self) -> &Party {
        &self.owner
    }

    /// Store a finalised transaction and consume its inputs. Recording the
    /// same transaction twice is a no-op.
    ///
    /// # Errors
    /// Returns `Rejected` if an input was already consumed by another
    /// transaction in this vault; nothing is recorded in that case.
    pub fn record(&self, ftx: &FinalizedTransaction) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.consumed.consume(&ftx.proposal().inputs, ftx.id())?;
        inner.transactions.insert(ftx.id(), ftx.clone());
        tracing::debug!(vault = %self.owner, tx = %ftx.id().short(), "transaction recorded");
        Ok(())
    }

    /// A recorded transaction by id.
    #[must_use]
    pub fn transaction(&self, tx_id: &SecureHash) -> Option<FinalizedTransaction> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .transactions
            .get(tx_id)
            .cloned()
    }

    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .transactions
            .len()
    }

    #[must_use]
    pub fn is_consumed(&self, state_ref: &StateRef) -> bool {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .consumed
            .is_consumed(state_ref)
    }

    /// Unconsumed outputs currently owned by `party`.
    #[must_use]
    pub fn unconsumed_owned_by(&self, party: &Party) -> Vec<StateRef> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut refs: Vec<StateRef> = inner
            .transactions
            .values()
            .flat_map(|ftx| {
                ftx.outputs()
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| &s.owner == party)
                    .filter_map(|(i, _)| u32::try_from(i).ok())
                    .map(|i| StateRef::new(ftx.id(), i))
                    .collect::<Vec<_>>()
            })
            .filter(|r| !inner.consumed.is_consumed(r))
            .collect();
        refs.sort();
        refs
    }
}

impl StateResolver for InMemoryLedger {
    fn resolve(&self, state_ref: &StateRef) -> Option<InstrumentState> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if inner.consumed.is_consumed(state_ref) {
            return None;
        }
        let index = usize::try_from(state_ref.index).ok()?;
        inner
            .transactions
            .get(&state_ref.tx_id)
            .and_then(|ftx| ftx.outputs().get(index).cloned())
    }
}
