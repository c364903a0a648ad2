//! # paperflow-finality
//!
//! **Finality Plane**: notarisation, state consumption, and distribution of
//! finalised transactions to participant vaults.
//!
//! ## Architecture
//!
//! A flow hands a [`SignedTransaction`](paperflow_types::SignedTransaction)
//! to a [`FinalityProtocol`], which:
//! 1. Checks every participant can be reached
//! 2. Has the [`Notary`] verify signatures and the time-window
//! 3. Consumes the inputs in the notary's [`ConsumptionRecord`] (no double-spend)
//! 4. Records the notarised transaction in each participant's [`InMemoryLedger`]
//!
//! [`InProcessFinality`] runs all of this in one process. Other transports
//! implement [`FinalityProtocol`] the same way.

pub mod consumption;
pub mod in_process;
pub mod ledger;
pub mod notary;
pub mod protocol;

pub use consumption::ConsumptionRecord;
pub use in_process::InProcessFinality;
pub use ledger::InMemoryLedger;
pub use notary::Notary;
pub use protocol::FinalityProtocol;
