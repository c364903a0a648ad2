//! Amounts and issued amounts.
//!
//! An [`IssuedAmount`] is only fungible with another if issuer, issuer
//! reference and denomination all match. Two issuances by the same bank under
//! different references are different instruments.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PartyAndReference, PaperflowError, Result};

/// An opaque byte sequence, e.g. an issuer reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OpaqueBytes(pub Vec<u8>);

impl OpaqueBytes {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for OpaqueBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for OpaqueBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for OpaqueBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", hex::encode_upper(&self.0))
    }
}

/// A non-negative quantity in a fixed denomination (e.g. "USD").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAmount")]
pub struct Amount {
    quantity: Decimal,
    denomination: String,
}

#[derive(Deserialize)]
struct RawAmount {
    quantity: Decimal,
    denomination: String,
}

impl TryFrom<RawAmount> for Amount {
    type Error = PaperflowError;

    fn try_from(raw: RawAmount) -> Result<Self> {
        Self::new(raw.quantity, raw.denomination)
    }
}

impl Amount {
    /// Create an amount.
    ///
    /// # Errors
    /// Returns [`PaperflowError::InvalidAmount`] for a negative quantity or an
    /// empty denomination.
    pub fn new(quantity: Decimal, denomination: impl Into<String>) -> Result<Self> {
        let denomination = denomination.into();
        if quantity < Decimal::ZERO {
            return Err(PaperflowError::InvalidAmount {
                reason: format!("quantity {quantity} is negative"),
            });
        }
        if denomination.trim().is_empty() {
            return Err(PaperflowError::InvalidAmount {
                reason: "denomination is empty".to_string(),
            });
        }
        Ok(Self {
            quantity,
            denomination,
        })
    }

    #[must_use]
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    #[must_use]
    pub fn denomination(&self) -> &str {
        &self.denomination
    }

    /// Tag this amount with its issuer, i.e. `amount issued by issuer`.
    #[must_use]
    pub fn issued_by(self, issuer: PartyAndReference) -> IssuedAmount {
        IssuedAmount {
            amount: self,
            issuer,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.denomination)
    }
}

/// An [`Amount`] tagged with the party that issued it and its issuer reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuedAmount {
    pub amount: Amount,
    pub issuer: PartyAndReference,
}

impl IssuedAmount {
    /// Whether the two amounts can be merged or netted against each other.
    #[must_use]
    pub fn is_fungible_with(&self, other: &Self) -> bool {
        self.issuer == other.issuer && self.amount.denomination == other.amount.denomination
    }
}

impl fmt::Display for IssuedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} issued by {}", self.amount, self.issuer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Party;

    fn usd(qty: i64) -> Amount {
        Amount::new(Decimal::new(qty, 0), "USD").unwrap()
    }

    #[test]
    fn negative_quantity_rejected() {
        let err = Amount::new(Decimal::new(-1, 0), "USD").unwrap_err();
        assert!(matches!(err, PaperflowError::InvalidAmount { .. }));
    }

    #[test]
    fn zero_quantity_allowed() {
        let amt = Amount::new(Decimal::ZERO, "USD").unwrap();
        assert!(amt.quantity().is_zero());
    }

    #[test]
    fn empty_denomination_rejected() {
        assert!(Amount::new(Decimal::ONE, "  ").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let amt: Amount = serde_json::from_str(r#"{"quantity":"1000","denomination":"USD"}"#).unwrap();
        assert_eq!(amt, usd(1000));

        let err = serde_json::from_str::<Amount>(r#"{"quantity":"-5","denomination":"USD"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("PF_ERR_101"), "{err}");
        assert!(serde_json::from_str::<Amount>(r#"{"quantity":"5","denomination":""}"#).is_err());
    }

    #[test]
    fn fungible_requires_issuer_reference_and_denomination() {
        let bank = Party::dummy("O=Bank");
        let a = usd(100).issued_by(bank.reference(vec![1].into()));
        let b = usd(50).issued_by(bank.reference(vec![1].into()));
        assert!(a.is_fungible_with(&b), "quantity does not affect fungibility");

        let other_ref = usd(100).issued_by(bank.reference(vec![2].into()));
        assert!(!a.is_fungible_with(&other_ref));

        let other_issuer = usd(100).issued_by(Party::dummy("O=Other").reference(vec![1].into()));
        assert!(!a.is_fungible_with(&other_issuer));

        let gbp = Amount::new(Decimal::new(100, 0), "GBP")
            .unwrap()
            .issued_by(bank.reference(vec![1].into()));
        assert!(!a.is_fungible_with(&gbp));
    }

    #[test]
    fn display_formats() {
        let bank = Party::new("O=Bank", crate::PartyKey([0; 32]));
        let issued = usd(1000).issued_by(bank.reference(vec![0x01].into()));
        assert_eq!(issued.to_string(), "1000 USD issued by O=Bank[01]");
    }
}
