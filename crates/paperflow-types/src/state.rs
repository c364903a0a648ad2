//! # InstrumentState: one unit of commercial paper
//!
//! ## Lifecycle
//!
//! ```text
//!   issuance tx          move tx
//!   ───────────▶ UNSPENT ───────▶ CONSUMED
//! ```
//!
//! A state is created only by an issuance and is never mutated. A move
//! consumes it and creates a successor that differs only in `owner`. Each
//! state is consumed at most once; the notary arbitrates that.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IssuedAmount, Party, SecureHash, constants};

/// One unit of commercial paper and its current owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentState {
    /// Face value, issuer and issuer reference.
    pub issued_amount: IssuedAmount,
    /// Current holder. The only field a move changes.
    pub owner: Party,
    /// When the paper can be redeemed.
    pub maturity_date: DateTime<Utc>,
    /// The notary that arbitrates consumption of this state.
    pub notary: Party,
}

impl InstrumentState {
    /// The successor state after a move to `new_owner`.
    #[must_use]
    pub fn with_new_owner(&self, new_owner: Party) -> Self {
        Self {
            owner: new_owner,
            ..self.clone()
        }
    }

    /// Parties that must learn about a transaction producing this state.
    #[must_use]
    pub fn participants(&self) -> Vec<&Party> {
        vec![&self.owner]
    }

    /// Append the canonical encoding of this state to `out`.
    ///
    /// Format: `"paperflow:state:v1:" || issuer || ref || quantity || denomination || owner || maturity || notary`,
    /// variable-length fields prefixed with their `u32` length. Instants are
    /// encoded at full precision (see [`encode_instant`]).
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(constants::STATE_DOMAIN);
        let issuer = &self.issued_amount.issuer;
        encode_party(out, &issuer.party);
        encode_bytes(out, issuer.reference.as_bytes());
        encode_bytes(
            out,
            self.issued_amount.amount.quantity().normalize().to_string().as_bytes(),
        );
        encode_bytes(out, self.issued_amount.amount.denomination().as_bytes());
        encode_party(out, &self.owner);
        encode_instant(out, self.maturity_date);
        encode_party(out, &self.notary);
    }
}

impl fmt::Display for InstrumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CP[{} owned by {} matures {}]",
            self.issued_amount, self.owner, self.maturity_date
        )
    }
}

pub(crate) fn encode_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(bytes);
}

/// Seconds since the epoch as `i64`, then the sub-second nanoseconds as `u32`.
pub(crate) fn encode_instant(out: &mut Vec<u8>, instant: DateTime<Utc>) {
    out.extend_from_slice(&instant.timestamp().to_le_bytes());
    out.extend_from_slice(&instant.timestamp_subsec_nanos().to_le_bytes());
}

pub(crate) fn encode_party(out: &mut Vec<u8>, party: &Party) {
    encode_bytes(out, party.name.as_bytes());
    out.extend_from_slice(party.owning_key.as_bytes());
}

/// Dummy state for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl InstrumentState {
    /// 1000 USD issued by `issuer` under reference `[01]`, owned by the issuer.
    pub fn dummy(issuer: &Party, notary: &Party) -> Self {
        let amount = crate::Amount::new(rust_decimal::Decimal::new(1000, 0), "USD")
            .expect("static amount is valid");
        Self {
            issued_amount: amount.issued_by(issuer.reference(vec![0x01].into())),
            owner: issuer.clone(),
            maturity_date: Utc::now() + chrono::Duration::days(10),
            notary: notary.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// StateRef / StateAndRef
// ---------------------------------------------------------------------------

/// Pointer to an output: `(transaction id, output index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct StateRef {
    pub tx_id: SecureHash,
    pub index: u32,
}

impl StateRef {
    #[must_use]
    pub fn new(tx_id: SecureHash, index: u32) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tx_id, self.index)
    }
}

/// A resolved state together with the reference it was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: InstrumentState,
    pub state_ref: StateRef,
}
