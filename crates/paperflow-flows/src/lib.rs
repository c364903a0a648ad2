//! # paperflow-flows
//!
//! **Coordination plane**: the issuance and transfer flows for commercial
//! paper, from an empty proposal to a finalised transaction.
//!
//! ## Architecture
//!
//! ```text
//! IssuanceCoordinator ──▶ FinalityProtocol ──▶ FinalizedTransaction (T1)
//!                                                      │
//! TransferCoordinator ◀────────────────────────────────┘
//!         └──────────▶ FinalityProtocol ──▶ FinalizedTransaction (T2)
//! ```
//!
//! Each run is tracked by a [`FlowTracker`] through
//! `BUILDING → SIGNED → AWAITING_FINALITY → FINALIZED`, or `FAILED` on the
//! first error. Errors are terminal: nothing is retried here, and the
//! returned [`FlowError`](paperflow_types::FlowError) names the step that
//! failed so the caller can decide whether to resubmit with fresh state.
//!
//! [`CommercialPaperIssueFlow`] chains both coordinators.

pub mod context;
mod driver;
pub mod issuance;
pub mod paper_flow;
pub mod tracker;
pub mod transfer;

pub use context::FlowContext;
pub use issuance::IssuanceCoordinator;
pub use paper_flow::CommercialPaperIssueFlow;
pub use tracker::FlowTracker;
pub use transfer::TransferCoordinator;
