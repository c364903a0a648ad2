//! Error types for Paperflow.
//!
//! All errors use the `PF_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: State reference / amount errors
//! - 2xx: Attachment errors
//! - 3xx: Time-window errors
//! - 4xx: Signing errors
//! - 5xx: Finality errors
//! - 6xx: Flow state machine errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{FlowId, FlowKind, FlowPhase, FlowStep, SecureHash, StateRef};

/// Central error enum for all Paperflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaperflowError {
    // =================================================================
    // Reference / Amount Errors (1xx)
    // =================================================================
    /// The input does not resolve to an existing, unconsumed state.
    #[error("PF_ERR_100: Invalid state reference {state_ref}: {reason}")]
    InvalidReference { state_ref: StateRef, reason: String },

    /// Negative quantity or empty denomination.
    #[error("PF_ERR_101: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// `build()` was called on a proposal that is not fully populated.
    #[error("PF_ERR_102: Invalid proposal: {reason}")]
    InvalidProposal { reason: String },

    // =================================================================
    // Attachment Errors (2xx)
    // =================================================================
    /// The content hash is not present in the attachment store.
    #[error("PF_ERR_200: Attachment not found: {0}")]
    AttachmentNotFound(SecureHash),

    // =================================================================
    // Time-Window Errors (3xx)
    // =================================================================
    /// The window end is not strictly after its start.
    #[error("PF_ERR_300: Invalid time-window: {reason}")]
    InvalidTimeWindow { reason: String },

    // =================================================================
    // Signing Errors (4xx)
    // =================================================================
    /// Key unavailable, or a signature is missing or does not verify.
    #[error("PF_ERR_400: Signing failed: {reason}")]
    Signing { reason: String },

    // =================================================================
    // Finality Errors (5xx)
    // =================================================================
    /// The notary or a peer refused the transaction (e.g. double-spend).
    #[error("PF_ERR_500: Transaction rejected: {reason}")]
    Rejected { reason: String },

    /// The finality exchange did not complete in time.
    #[error("PF_ERR_501: Finality timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// A collaborator returned a malformed or unexpected result.
    #[error("PF_ERR_502: Protocol violation: {reason}")]
    ProtocolViolation { reason: String },

    // =================================================================
    // Flow Errors (6xx)
    // =================================================================
    /// A coordinator attempted an illegal phase transition.
    #[error("PF_ERR_600: Invalid flow transition: {from} -> {to}")]
    InvalidTransition { from: FlowPhase, to: FlowPhase },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PF_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PF_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad hash, zero duration).
    #[error("PF_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PaperflowError>;

impl From<serde_json::Error> for PaperflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Error surfaced to callers of a coordinator: the underlying failure plus
/// which flow and step it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{flow} {flow_id} failed at {step}: {source}")]
pub struct FlowError {
    pub flow_id: FlowId,
    pub flow: FlowKind,
    pub step: FlowStep,
    #[source]
    pub source: PaperflowError,
}

impl FlowError {
    /// The underlying error kind.
    #[must_use]
    pub fn kind(&self) -> &PaperflowError {
        &self.source
    }
}

/// Error returned by `issue`.
pub type IssuanceError = FlowError;

/// Error returned by `transfer_previously_issued`.
pub type TransferError = FlowError;
