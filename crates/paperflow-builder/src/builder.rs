//! Transaction builder: accumulates a proposal before it is signed.
//!
//! The builder validates what it can see locally (inputs resolve, attachments
//! exist, time-windows are non-empty) and leaves contract rules to the
//! contract engine. [`TransactionBuilder::build`] returns an owned snapshot:
//! later calls on the builder never reach a proposal already handed out.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use paperflow_types::{
    InstrumentState, PaperflowError, Party, Result, SecureHash, StateRef, TimeWindow,
    TransactionKind, TransactionProposal,
};

use crate::traits::{AttachmentStore, StateResolver};

/// Incrementally assembles a [`TransactionProposal`].
pub struct TransactionBuilder<'a> {
    resolver: &'a dyn StateResolver,
    attachment_store: &'a dyn AttachmentStore,
    notary: Party,
    kind: Option<TransactionKind>,
    inputs: Vec<StateRef>,
    outputs: Vec<InstrumentState>,
    attachments: BTreeSet<SecureHash>,
    time_window: Option<TimeWindow>,
    required_signers: BTreeSet<Party>,
}

impl<'a> TransactionBuilder<'a> {
    /// Start an empty proposal notarised by `notary`.
    #[must_use]
    pub fn new(
        notary: Party,
        resolver: &'a dyn StateResolver,
        attachment_store: &'a dyn AttachmentStore,
    ) -> Self {
        Self {
            resolver,
            attachment_store,
            notary,
            kind: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            attachments: BTreeSet::new(),
            time_window: None,
            required_signers: BTreeSet::new(),
        }
    }

    /// Append an input and return the state it resolves to.
    ///
    /// # Errors
    /// Returns [`PaperflowError::InvalidReference`] if the reference does not
    /// resolve to an unconsumed state, or is already an input.
    pub fn add_input(&mut self, state_ref: StateRef) -> Result<InstrumentState> {
        let state = self.resolve_input(state_ref)?;
        self.push_resolved_input(state_ref);
        Ok(state)
    }

    /// Resolve a prospective input without adding it.
    ///
    /// # Errors
    /// Same as [`Self::add_input`].
    pub fn resolve_input(&self, state_ref: StateRef) -> Result<InstrumentState> {
        if self.inputs.contains(&state_ref) {
            return Err(PaperflowError::InvalidReference {
                state_ref,
                reason: "already an input of this proposal".to_string(),
            });
        }
        self.resolver
            .resolve(&state_ref)
            .ok_or_else(|| PaperflowError::InvalidReference {
                state_ref,
                reason: "not found or already consumed".to_string(),
            })
    }

    /// Append an input already checked by [`Self::resolve_input`].
    pub(crate) fn push_resolved_input(&mut self, state_ref: StateRef) {
        self.inputs.push(state_ref);
    }

    /// Append an output. Contract validity is not checked here.
    pub fn add_output(&mut self, state: InstrumentState) -> &mut Self {
        self.outputs.push(state);
        self
    }

    /// Reference a stored document by content hash.
    ///
    /// # Errors
    /// Returns [`PaperflowError::AttachmentNotFound`] if the store does not hold it.
    pub fn add_attachment(&mut self, hash: SecureHash) -> Result<&mut Self> {
        let attachment = self
            .attachment_store
            .open(&hash)
            .ok_or(PaperflowError::AttachmentNotFound(hash))?;
        self.attachments.insert(attachment.id);
        Ok(self)
    }

    /// Require notarisation within `[from, until)`.
    ///
    /// # Errors
    /// Returns [`PaperflowError::InvalidTimeWindow`] unless `until > from`.
    pub fn set_time_window(&mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Result<&mut Self> {
        self.time_window = Some(TimeWindow::between(from, until)?);
        Ok(self)
    }

    /// Require notarisation within `duration` of `from`.
    ///
    /// # Errors
    /// Returns [`PaperflowError::InvalidTimeWindow`] for a non-positive duration.
    pub fn set_time_window_duration(&mut self, from: DateTime<Utc>, duration: Duration) -> Result<&mut Self> {
        self.time_window = Some(TimeWindow::from_start_and_duration(from, duration)?);
        Ok(self)
    }

    pub fn set_kind(&mut self, kind: TransactionKind) -> &mut Self {
        self.kind = Some(kind);
        self
    }

    pub fn add_required_signer(&mut self, party: Party) -> &mut Self {
        self.required_signers.insert(party);
        self
    }

    #[must_use]
    pub fn notary(&self) -> &Party {
        &self.notary
    }

    #[must_use]
    pub fn inputs(&self) -> &[StateRef] {
        &self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> &[InstrumentState] {
        &self.outputs
    }

    /// Snapshot the proposal.
    ///
    /// # Errors
    /// Returns [`PaperflowError::InvalidProposal`] unless the proposal has a
    /// kind, at least one output, at least one required signer, and inputs
    /// consistent with its kind (none for an issue, some for a move).
    pub fn build(&self) -> Result<TransactionProposal> {
        let kind = self.kind.ok_or_else(|| invalid("no transaction kind set"))?;
        if self.outputs.is_empty() {
            return Err(invalid("no outputs"));
        }
        if self.required_signers.is_empty() {
            return Err(invalid("no required signers"));
        }
        match kind {
            TransactionKind::Issue if !self.inputs.is_empty() => {
                return Err(invalid("an issue must not consume inputs"));
            }
            TransactionKind::Move if self.inputs.is_empty() => {
                return Err(invalid("a move must consume at least one input"));
            }
            _ => {}
        }

        Ok(TransactionProposal {
            kind,
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            attachments: self.attachments.clone(),
            time_window: self.time_window,
            notary: self.notary.clone(),
            required_signers: self.required_signers.clone(),
        })
    }
}

impl fmt::Debug for TransactionBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("notary", &self.notary)
            .field("kind", &self.kind)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs.len())
            .field("attachments", &self.attachments)
            .finish_non_exhaustive()
    }
}

fn invalid(reason: &str) -> PaperflowError {
    PaperflowError::InvalidProposal {
        reason: reason.to_string(),
    }
}
