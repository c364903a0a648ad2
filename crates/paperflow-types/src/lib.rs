//! # paperflow-types
//!
//! Shared types, errors, and configuration for **Paperflow**, the commercial
//! paper issuance and transfer workflow.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`SecureHash`], [`FlowId`]
//! - **Parties**: [`Party`], [`PartyKey`], [`PartyAndReference`]
//! - **Amounts**: [`Amount`], [`IssuedAmount`], [`OpaqueBytes`]
//! - **States**: [`InstrumentState`], [`StateRef`], [`StateAndRef`]
//! - **Transactions**: [`TransactionProposal`], [`SignedTransaction`], [`FinalizedTransaction`], [`TimeWindow`]
//! - **Flow lifecycle**: [`FlowPhase`], [`FlowStep`], [`FlowKind`]
//! - **Configuration**: [`FlowConfig`], [`Clock`]
//! - **Errors**: [`PaperflowError`] with `PF_ERR_` prefix codes, [`FlowError`]
//! - **Constants**: prospectus hash and default durations

pub mod amount;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod flow;
pub mod ids;
pub mod party;
pub mod state;
pub mod time_window;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use paperflow_types::{Party, InstrumentState, SignedTransaction, ...};

pub use amount::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use flow::*;
pub use ids::*;
pub use party::*;
pub use state::{InstrumentState, StateAndRef, StateRef};
pub use time_window::*;
pub use transaction::*;

// Constants are accessed via `paperflow_types::constants::FOO`
// (not re-exported to avoid name collisions).
