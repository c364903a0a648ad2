//! Per-flow state machine and progress.
//!
//! A [`FlowTracker`] owns the [`FlowPhase`] of one running flow, the step it
//! is currently executing and a human-readable progress label. Every error
//! leaving a coordinator goes through [`FlowTracker::fail`], which moves the
//! flow to FAILED and tags the error with the flow id and step.

use paperflow_types::{FlowError, FlowId, FlowKind, FlowPhase, FlowStep, PaperflowError, Result};

/// Tracks one flow from BUILDING to FINALIZED or FAILED.
#[derive(Debug, Clone)]
pub struct FlowTracker {
    id: FlowId,
    kind: FlowKind,
    phase: FlowPhase,
    step: FlowStep,
    label: Option<&'static str>,
    history: Vec<FlowPhase>,
}

impl FlowTracker {
    /// A fresh flow in BUILDING, positioned at the first step of `kind`.
    #[must_use]
    pub fn new(kind: FlowKind) -> Self {
        let step = match kind {
            FlowKind::Issuance => FlowStep::ComputeAmount,
            FlowKind::Transfer => FlowStep::ResolveInput,
        };
        Self {
            id: FlowId::new(),
            kind,
            phase: FlowPhase::Building,
            step,
            label: None,
            history: vec![FlowPhase::Building],
        }
    }

    #[must_use]
    pub fn id(&self) -> FlowId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// The step being executed, or the one that failed.
    #[must_use]
    pub fn step(&self) -> FlowStep {
        self.step
    }

    /// Current progress label.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        self.label
    }

    /// Every phase the flow has been in, oldest first.
    #[must_use]
    pub fn history(&self) -> &[FlowPhase] {
        &self.history
    }

    pub fn set_label(&mut self, label: &'static str) {
        tracing::info!(flow_id = %self.id, flow = %self.kind, progress = label, "progress");
        self.label = Some(label);
    }

    /// Begin `step`.
    pub fn enter(&mut self, step: FlowStep) {
        tracing::debug!(flow_id = %self.id, flow = %self.kind, %step, "step started");
        self.step = step;
    }

    /// Move to `to`.
    ///
    /// # Errors
    /// Fails the flow with `InvalidTransition` if `to` is not reachable from
    /// the current phase.
    pub fn advance(&mut self, to: FlowPhase) -> std::result::Result<(), FlowError> {
        let result = self.transition(to);
        self.check(result)
    }

    /// Pass `result` through, failing the flow on error.
    ///
    /// # Errors
    /// Returns the error tagged with this flow's id and current step.
    pub fn check<T>(&mut self, result: Result<T>) -> std::result::Result<T, FlowError> {
        result.map_err(|source| self.fail(source))
    }

    /// Move to FAILED (unless already terminal) and wrap `source`.
    pub fn fail(&mut self, source: PaperflowError) -> FlowError {
        if self.phase.can_transition_to(FlowPhase::Failed) {
            self.phase = FlowPhase::Failed;
            self.history.push(FlowPhase::Failed);
        }
        tracing::warn!(
            flow_id = %self.id,
            flow = %self.kind,
            step = %self.step,
            error = %source,
            "flow failed"
        );
        FlowError {
            flow_id: self.id,
            flow: self.kind,
            step: self.step,
            source,
        }
    }

    fn transition(&mut self, to: FlowPhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(PaperflowError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::info!(
            flow_id = %self.id,
            flow = %self.kind,
            step = %self.step,
            from = %self.phase,
            %to,
            "flow phase transition"
        );
        self.phase = to;
        self.history.push(to);
        Ok(())
    }
}
