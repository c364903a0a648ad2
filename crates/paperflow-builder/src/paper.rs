//! Commercial paper transaction generation.
//!
//! Fills a [`TransactionBuilder`] with the outputs, kind and signers a
//! commercial paper issue or move needs. Attachments and time-windows are
//! left to the caller.

use chrono::{DateTime, Utc};
use paperflow_types::{
    InstrumentState, IssuedAmount, PaperflowError, Party, Result, StateAndRef, StateRef,
    TransactionKind,
};

use crate::builder::TransactionBuilder;

/// Generators for the commercial paper contract's transactions.
pub struct CommercialPaper;

impl CommercialPaper {
    /// Add a new paper owned by its issuer, maturing at `maturity_date`.
    ///
    /// The issuer is the only required signer.
    pub fn generate_issue(
        builder: &mut TransactionBuilder<'_>,
        issued_amount: IssuedAmount,
        maturity_date: DateTime<Utc>,
    ) -> InstrumentState {
        let issuer = issued_amount.issuer.party.clone();
        let state = InstrumentState {
            owner: issuer.clone(),
            issued_amount,
            maturity_date,
            notary: builder.notary().clone(),
        };
        builder
            .set_kind(TransactionKind::Issue)
            .add_output(state.clone())
            .add_required_signer(issuer);
        state
    }

    /// Consume `paper` and re-create it owned by `new_owner`.
    ///
    /// The current owner is the only required signer.
    ///
    /// # Errors
    /// - `InvalidReference` if `paper` no longer resolves
    /// - `InvalidProposal` if the paper is controlled by a different notary
    pub fn generate_move(
        builder: &mut TransactionBuilder<'_>,
        paper: StateRef,
        new_owner: Party,
    ) -> Result<StateAndRef> {
        let input = builder.resolve_input(paper)?;
        if &input.notary != builder.notary() {
            return Err(PaperflowError::InvalidProposal {
                reason: format!(
                    "input {paper} is notarised by {}, proposal by {}",
                    input.notary,
                    builder.notary()
                ),
            });
        }
        builder.push_resolved_input(paper);
        builder
            .set_kind(TransactionKind::Move)
            .add_output(input.with_new_owner(new_owner))
            .add_required_signer(input.owner.clone());
        Ok(StateAndRef {
            state: input,
            state_ref: paper,
        })
    }
}
