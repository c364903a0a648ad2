//! Narrow interfaces to the collaborators a transaction is built against.
//!
//! The ledger, the attachment store and key management live outside this
//! workspace's core; coordinators reach them only through these traits.

use std::sync::Arc;

use paperflow_types::{InstrumentState, Party, Result, SecureHash, StateRef, TransactionProposal, TransactionSignature};

/// Looks up unconsumed states on the ledger.
pub trait StateResolver: Send + Sync {
    /// The state `state_ref` points at, or `None` if it does not exist or has
    /// already been consumed.
    fn resolve(&self, state_ref: &StateRef) -> Option<InstrumentState>;
}

/// Handle to a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: SecureHash,
    pub content: Arc<[u8]>,
}

/// Content-addressed document storage.
pub trait AttachmentStore: Send + Sync {
    /// Open the attachment with this content hash, if stored.
    fn open(&self, hash: &SecureHash) -> Option<Attachment>;
}

/// Produces signatures for parties whose private keys it holds.
pub trait SigningService: Send + Sync {
    /// Sign the proposal's id as `party`. Deterministic for a given key.
    ///
    /// # Errors
    /// Returns [`paperflow_types::PaperflowError::Signing`] if the key for
    /// `party` is not available.
    fn sign(&self, proposal: &TransactionProposal, party: &Party) -> Result<TransactionSignature>;
}
