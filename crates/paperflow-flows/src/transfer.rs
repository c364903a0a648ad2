//! Transfer: move a previously issued paper to a new owner.
//!
//! ## Protocol
//!
//! ```text
//! resolve-input → build-proposal → sign → finalize → check-result
//! ```
//!
//! The input is output 0 of the issuance. It must still resolve through the
//! context's [`StateResolver`](paperflow_builder::StateResolver); a paper
//! that has already moved fails at `resolve-input` with `InvalidReference`.
//! The new state is the input with only its owner replaced, under the same
//! notary.

use paperflow_builder::{CommercialPaper, TransactionBuilder};
use paperflow_types::{
    FinalizedTransaction, FlowKind, FlowStep, PaperflowError, Party, TransferError, constants,
};

use crate::context::FlowContext;
use crate::driver;
use crate::tracker::FlowTracker;

/// Moves commercial paper owned by the context's local party.
#[derive(Debug, Clone)]
pub struct TransferCoordinator {
    ctx: FlowContext,
}

impl TransferCoordinator {
    #[must_use]
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    /// Move the paper issued by `issuance` to `recipient`.
    pub async fn transfer_previously_issued(
        &self,
        issuance: &FinalizedTransaction,
        recipient: Party,
    ) -> Result<FinalizedTransaction, TransferError> {
        let mut tracker = FlowTracker::new(FlowKind::Transfer);
        self.run(&mut tracker, issuance, recipient).await
    }

    /// [`Self::transfer_previously_issued`] against a caller-owned tracker.
    pub async fn run(
        &self,
        tracker: &mut FlowTracker,
        issuance: &FinalizedTransaction,
        recipient: Party,
    ) -> Result<FinalizedTransaction, TransferError> {
        let ctx = &self.ctx;
        tracker.set_label(constants::MOVING_STEP_LABEL);

        tracker.enter(FlowStep::ResolveInput);
        let paper = tracker.check(issuance.out_ref(0))?;
        if ctx.resolver.resolve(&paper.state_ref).is_none() {
            return Err(tracker.fail(PaperflowError::InvalidReference {
                state_ref: paper.state_ref,
                reason: "consumed or unknown to the local vault".to_string(),
            }));
        }
        tracing::info!(
            flow_id = %tracker.id(),
            paper = %paper.state_ref,
            from = %paper.state.owner,
            to = %recipient,
            "moving commercial paper"
        );

        let stx = {
            tracker.enter(FlowStep::BuildProposal);
            let mut builder = TransactionBuilder::new(
                paper.state.notary.clone(),
                ctx.resolver.as_ref(),
                ctx.attachments.as_ref(),
            );
            tracker.check(CommercialPaper::generate_move(
                &mut builder,
                paper.state_ref,
                recipient,
            ))?;

            driver::sign(ctx, tracker, &builder)?
        };

        driver::finalize(ctx, tracker, stx).await
    }
}
