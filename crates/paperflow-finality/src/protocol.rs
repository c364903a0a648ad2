use async_trait::async_trait;
use paperflow_types::{FinalizedTransaction, Result, SignedTransaction};

/// Takes a signed transaction to finality: notarisation, then distribution
/// to every participant.
///
/// Implementations may make several network round trips. Callers treat the
/// call as one suspension point and must not retry on failure without
/// re-resolving their inputs.
#[async_trait]
pub trait FinalityProtocol: Send + Sync {
    /// Finalise `stx`, returning every transaction the exchange finalised.
    ///
    /// # Errors
    /// - `Rejected` if the notary or a peer refuses the transaction
    /// - `Timeout` if the exchange does not complete
    async fn finalize(&self, stx: SignedTransaction) -> Result<Vec<FinalizedTransaction>>;
}
