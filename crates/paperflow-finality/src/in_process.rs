//! In-process finality: notarise, then distribute to participant vaults.
//!
//! 1. Check every participant has a reachable vault
//! 2. Have the notary check and consume the inputs
//! 3. Record the finalised transaction in every participant's vault
//!
//! Routing is checked before notarisation so a transaction that cannot be
//! distributed never consumes its inputs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use paperflow_types::{
    Clock, FinalizedTransaction, PaperflowError, Party, PartyKey, Result, SignedTransaction,
};

use crate::ledger::InMemoryLedger;
use crate::notary::Notary;
use crate::protocol::FinalityProtocol;

/// Finality over a single notary and a set of in-memory vaults.
pub struct InProcessFinality {
    notary: Notary,
    clock: Arc<dyn Clock>,
    vaults: RwLock<HashMap<PartyKey, Arc<InMemoryLedger>>>,
}

impl InProcessFinality {
    #[must_use]
    pub fn new(notary: Notary, clock: Arc<dyn Clock>) -> Self {
        Self {
            notary,
            clock,
            vaults: RwLock::new(HashMap::new()),
        }
    }

    /// Make `vault` reachable as its owner.
    pub fn register_vault(&self, vault: Arc<InMemoryLedger>) {
        self.vaults
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(vault.owner().owning_key, vault);
    }

    #[must_use]
    pub fn notary(&self) -> &Notary {
        &self.notary
    }

    fn route(
        &self,
        participants: impl IntoIterator<Item = Party>,
    ) -> Result<Vec<(Party, Arc<InMemoryLedger>)>> {
        let vaults = self
            .vaults
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        participants
            .into_iter()
            .map(|party| match vaults.get(&party.owning_key) {
                Some(vault) => Ok((party, Arc::clone(vault))),
                None => Err(PaperflowError::Rejected {
                    reason: format!("no route to participant {party}"),
                }),
            })
            .collect()
    }
}

#[async_trait]
impl FinalityProtocol for InProcessFinality {
    async fn finalize(&self, stx: SignedTransaction) -> Result<Vec<FinalizedTransaction>> {
        let routes = self.route(stx.proposal().participants())?;

        let notary_signature = self.notary.notarise(&stx)?;

        let recipients: Vec<Party> = routes.iter().map(|(p, _)| p.clone()).collect();
        let ftx = FinalizedTransaction::new(stx, notary_signature, recipients, self.clock.now());

        for (party, vault) in &routes {
            vault.record(&ftx).map_err(|e| PaperflowError::ProtocolViolation {
                reason: format!("vault of {party} refused notarised tx {}: {e}", ftx.id()),
            })?;
        }
        tracing::info!(
            tx = %ftx.id().short(),
            recipients = ftx.recipients().len(),
            "transaction finalised and distributed"
        );
        Ok(vec![ftx])
    }
}
