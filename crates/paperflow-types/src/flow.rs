//! Flow lifecycle types shared by the issuance and transfer coordinators.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────────┐  sign   ┌────────┐  submit  ┌───────────────────┐  confirmed  ┌───────────┐
//!   │ BUILDING ├────────▶│ SIGNED ├─────────▶│ AWAITING_FINALITY ├────────────▶│ FINALIZED │
//!   └────┬─────┘         └───┬────┘          └─────────┬─────────┘             └───────────┘
//!        │                   │                         │
//!        └───────────────────┴──────── error ──────────┴──────────▶ FAILED
//! ```
//!
//! FINALIZED and FAILED are terminal: no transition leaves them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a coordinator is in its protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowPhase {
    /// Assembling the proposal: inputs, outputs, attachments, time-window.
    Building,
    /// The proposal is signed by the local party and immutable.
    Signed,
    /// Submitted to the finality protocol; suspended until it answers.
    AwaitingFinality,
    /// Notarised and distributed. **Terminal.**
    Finalized,
    /// A step failed. **Terminal.**
    Failed,
}

impl FlowPhase {
    /// Can the flow move from this phase to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Building, Self::Signed)
                | (Self::Signed, Self::AwaitingFinality)
                | (Self::AwaitingFinality, Self::Finalized)
                | (
                    Self::Building | Self::Signed | Self::AwaitingFinality,
                    Self::Failed
                )
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Building => write!(f, "BUILDING"),
            Self::Signed => write!(f, "SIGNED"),
            Self::AwaitingFinality => write!(f, "AWAITING_FINALITY"),
            Self::Finalized => write!(f, "FINALIZED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Which coordinator a flow belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    Issuance,
    Transfer,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issuance => write!(f, "ISSUANCE"),
            Self::Transfer => write!(f, "TRANSFER"),
        }
    }
}

/// Individual protocol steps, in the order coordinators run them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowStep {
    /// Issuance: derive the issued amount from amount, self and issue ref.
    ComputeAmount,
    /// Transfer: resolve the issuance output being moved.
    ResolveInput,
    /// Add inputs and outputs to the builder.
    BuildProposal,
    /// Issuance: attach the prospectus.
    AttachProspectus,
    /// Issuance: set the notarisation time-window.
    SetTimeWindow,
    /// Sign as the local party.
    Sign,
    /// Suspend on the finality protocol.
    Finalize,
    /// Check the finality protocol returned exactly one transaction.
    CheckResult,
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ComputeAmount => "compute-amount",
            Self::ResolveInput => "resolve-input",
            Self::BuildProposal => "build-proposal",
            Self::AttachProspectus => "attach-prospectus",
            Self::SetTimeWindow => "set-time-window",
            Self::Sign => "sign",
            Self::Finalize => "finalize",
            Self::CheckResult => "check-result",
        };
        f.write_str(s)
    }
}
