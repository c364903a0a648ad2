//! Transaction types, from unsigned proposal to finalised record.
//!
//! ```text
//!   TransactionProposal ──sign──▶ SignedTransaction ──notarise+distribute──▶ FinalizedTransaction
//! ```
//!
//! Each stage is a distinct type. A [`SignedTransaction`] exposes its proposal
//! by shared reference only, so nothing covered by a signature can change
//! after signing.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier};
use serde::{Deserialize, Serialize};

use crate::state::{encode_bytes, encode_instant, encode_party};
use crate::{
    InstrumentState, PaperflowError, Party, PartyKey, Result, SecureHash, StateAndRef, StateRef,
    TimeWindow, constants,
};

/// What a transaction does to commercial paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Creates new paper from nothing. Signed by the issuer.
    Issue,
    /// Consumes paper and re-creates it under a new owner. Signed by the old owner.
    Move,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "ISSUE"),
            Self::Move => write!(f, "MOVE"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionProposal
// ---------------------------------------------------------------------------

/// An unsigned, fully-populated state transition.
///
/// Produced by the transaction builder as a snapshot; later builder calls
/// never reach a proposal that has already been built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProposal {
    pub kind: TransactionKind,
    /// States consumed, in order.
    pub inputs: Vec<StateRef>,
    /// States produced, in order. Output `i` becomes `StateRef(id, i)`.
    pub outputs: Vec<InstrumentState>,
    /// Content hashes of referenced documents.
    pub attachments: BTreeSet<SecureHash>,
    pub time_window: Option<TimeWindow>,
    pub notary: Party,
    pub required_signers: BTreeSet<Party>,
}

impl TransactionProposal {
    /// Canonical encoding every signature covers.
    ///
    /// Format: `"paperflow:tx:v1:" || kind || inputs || outputs || attachments || time_window || notary || signers`,
    /// each collection prefixed with its `u32` length.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(512);
        out.extend_from_slice(constants::PROPOSAL_DOMAIN);
        out.push(match self.kind {
            TransactionKind::Issue => 0,
            TransactionKind::Move => 1,
        });

        push_len(&mut out, self.inputs.len());
        for input in &self.inputs {
            out.extend_from_slice(input.tx_id.as_bytes());
            out.extend_from_slice(&input.index.to_le_bytes());
        }

        push_len(&mut out, self.outputs.len());
        for output in &self.outputs {
            let mut encoded = Vec::new();
            output.encode_into(&mut encoded);
            encode_bytes(&mut out, &encoded);
        }

        push_len(&mut out, self.attachments.len());
        for hash in &self.attachments {
            out.extend_from_slice(hash.as_bytes());
        }

        match &self.time_window {
            Some(tw) => {
                out.push(1);
                encode_instant(&mut out, tw.from_time());
                encode_instant(&mut out, tw.until_time());
            }
            None => out.push(0),
        }

        encode_party(&mut out, &self.notary);

        push_len(&mut out, self.required_signers.len());
        for signer in &self.required_signers {
            encode_party(&mut out, signer);
        }
        out
    }

    /// Transaction id: SHA-256 of the canonical encoding.
    #[must_use]
    pub fn id(&self) -> SecureHash {
        SecureHash::sha256(&self.canonical_bytes())
    }

    /// Everyone who must receive the finalised transaction: output owners and
    /// required signers. Never includes the notary unless it is also one of those.
    #[must_use]
    pub fn participants(&self) -> BTreeSet<Party> {
        self.outputs
            .iter()
            .flat_map(InstrumentState::participants)
            .chain(self.required_signers.iter())
            .cloned()
            .collect()
    }
}

fn push_len(out: &mut Vec<u8>, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_le_bytes());
}

// ---------------------------------------------------------------------------
// TransactionSignature
// ---------------------------------------------------------------------------

/// An ed25519 signature over a transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    /// Public key of the signer.
    pub by: PartyKey,
    /// 64 signature bytes.
    pub bytes: Vec<u8>,
}

impl TransactionSignature {
    /// Check this signature against a transaction id.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Signing`] for a malformed key or signature, or a mismatch.
    pub fn verify(&self, tx_id: &SecureHash) -> Result<()> {
        let key = self.by.verifying_key()?;
        let sig_bytes: [u8; 64] =
            self.bytes
                .as_slice()
                .try_into()
                .map_err(|_| PaperflowError::Signing {
                    reason: format!(
                        "signature by {} is {} bytes, expected 64",
                        self.by,
                        self.bytes.len()
                    ),
                })?;
        key.verify(tx_id.as_bytes(), &Signature::from_bytes(&sig_bytes))
            .map_err(|_| PaperflowError::Signing {
                reason: format!("signature by {} does not verify against tx {tx_id}", self.by),
            })
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A proposal plus its signatures. The proposal is read-only from here on.
///
/// `id` always equals `proposal.id()`; deserialization rejects a payload
/// whose stored id does not match its proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSignedTransaction")]
pub struct SignedTransaction {
    proposal: TransactionProposal,
    id: SecureHash,
    signatures: Vec<TransactionSignature>,
}

#[derive(Deserialize)]
struct RawSignedTransaction {
    proposal: TransactionProposal,
    id: SecureHash,
    signatures: Vec<TransactionSignature>,
}

impl TryFrom<RawSignedTransaction> for SignedTransaction {
    type Error = PaperflowError;

    fn try_from(raw: RawSignedTransaction) -> Result<Self> {
        let stx = Self::new(raw.proposal, raw.signatures);
        if stx.id != raw.id {
            return Err(PaperflowError::Signing {
                reason: format!("stored id {} does not match proposal id {}", raw.id, stx.id),
            });
        }
        Ok(stx)
    }
}

impl SignedTransaction {
    /// Wrap a proposal with signatures. Nothing is verified here; see
    /// [`Self::verify_signatures`].
    #[must_use]
    pub fn new(proposal: TransactionProposal, signatures: Vec<TransactionSignature>) -> Self {
        let id = proposal.id();
        Self {
            proposal,
            id,
            signatures,
        }
    }

    #[must_use]
    pub fn id(&self) -> SecureHash {
        self.id
    }

    #[must_use]
    pub fn proposal(&self) -> &TransactionProposal {
        &self.proposal
    }

    #[must_use]
    pub fn signatures(&self) -> &[TransactionSignature] {
        &self.signatures
    }

    /// Required signers with no signature present.
    #[must_use]
    pub fn missing_signers(&self) -> Vec<&Party> {
        self.proposal
            .required_signers
            .iter()
            .filter(|p| !self.signatures.iter().any(|s| s.by == p.owning_key))
            .collect()
    }

    /// Valid only when every required signer has signed and every signature
    /// present verifies against the transaction id.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Signing`] naming the first missing or bad signature.
    pub fn verify_signatures(&self) -> Result<()> {
        let recomputed = self.proposal.id();
        if recomputed != self.id {
            return Err(PaperflowError::Signing {
                reason: format!("tx id {} does not match proposal id {recomputed}", self.id),
            });
        }
        if let Some(missing) = self.missing_signers().first() {
            return Err(PaperflowError::Signing {
                reason: format!("missing signature from {missing} on tx {}", self.id),
            });
        }
        for sig in &self.signatures {
            sig.verify(&self.id)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FinalizedTransaction
// ---------------------------------------------------------------------------

/// A signed transaction that the notary has confirmed and every participant
/// has recorded. Terminal and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedTransaction {
    signed: SignedTransaction,
    notary_signature: TransactionSignature,
    recipients: Vec<Party>,
    finalized_at: DateTime<Utc>,
}

impl FinalizedTransaction {
    #[must_use]
    pub fn new(
        signed: SignedTransaction,
        notary_signature: TransactionSignature,
        recipients: Vec<Party>,
        finalized_at: DateTime<Utc>,
    ) -> Self {
        Self {
            signed,
            notary_signature,
            recipients,
            finalized_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> SecureHash {
        self.signed.id()
    }

    #[must_use]
    pub fn signed(&self) -> &SignedTransaction {
        &self.signed
    }

    #[must_use]
    pub fn proposal(&self) -> &TransactionProposal {
        self.signed.proposal()
    }

    #[must_use]
    pub fn outputs(&self) -> &[InstrumentState] {
        &self.signed.proposal().outputs
    }

    #[must_use]
    pub fn notary_signature(&self) -> &TransactionSignature {
        &self.notary_signature
    }

    /// Parties the transaction was distributed to.
    #[must_use]
    pub fn recipients(&self) -> &[Party] {
        &self.recipients
    }

    #[must_use]
    pub fn finalized_at(&self) -> DateTime<Utc> {
        self.finalized_at
    }

    /// Reference to output `index`, with the state it points at.
    ///
    /// # Errors
    /// Returns [`PaperflowError::InvalidReference`] if there is no such output.
    pub fn out_ref(&self, index: u32) -> Result<StateAndRef> {
        let state_ref = StateRef::new(self.id(), index);
        let state = usize::try_from(index)
            .ok()
            .and_then(|i| self.outputs().get(i))
            .ok_or_else(|| PaperflowError::InvalidReference {
                state_ref,
                reason: format!("tx has {} outputs", self.outputs().len()),
            })?;
        Ok(StateAndRef {
            state: state.clone(),
            state_ref,
        })
    }
}
