//! Issuance: create a new commercial paper owned by the local party.
//!
//! ## Protocol
//!
//! ```text
//! compute-amount → build-proposal → attach-prospectus → set-time-window
//!     → sign → finalize → check-result
//! ```
//!
//! Steps run in this order and none is skipped. The paper matures
//! `validity_period` after the clock's `now`; the notarisation window opens
//! at the same instant and stays open for `time_window_tolerance`.

use paperflow_builder::{CommercialPaper, TransactionBuilder};
use paperflow_types::{
    Amount, FinalizedTransaction, FlowKind, FlowStep, IssuanceError, OpaqueBytes, PaperflowError,
    Party, constants,
};

use crate::context::FlowContext;
use crate::driver;
use crate::tracker::FlowTracker;

/// Issues commercial paper as the context's local party.
#[derive(Debug, Clone)]
pub struct IssuanceCoordinator {
    ctx: FlowContext,
}

impl IssuanceCoordinator {
    #[must_use]
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    /// Issue `amount` under `issue_ref`, notarised by `notary`.
    ///
    /// The paper is owned by the issuer; `recipient` is the party it is
    /// being issued for and the target of the follow-up transfer.
    pub async fn issue(
        &self,
        amount: Amount,
        issue_ref: OpaqueBytes,
        recipient: &Party,
        notary: Party,
    ) -> Result<FinalizedTransaction, IssuanceError> {
        let mut tracker = FlowTracker::new(FlowKind::Issuance);
        self.run(&mut tracker, amount, issue_ref, recipient, notary)
            .await
    }

    /// [`Self::issue`] against a caller-owned tracker.
    pub async fn run(
        &self,
        tracker: &mut FlowTracker,
        amount: Amount,
        issue_ref: OpaqueBytes,
        recipient: &Party,
        notary: Party,
    ) -> Result<FinalizedTransaction, IssuanceError> {
        let ctx = &self.ctx;
        tracker.set_label(constants::ISSUING_STEP_LABEL);
        tracing::info!(
            flow_id = %tracker.id(),
            issuer = %ctx.me,
            %recipient,
            %notary,
            amount = %amount.quantity(),
            denomination = amount.denomination(),
            "issuing commercial paper"
        );

        tracker.enter(FlowStep::ComputeAmount);
        let now = ctx.clock.now();
        let validity = tracker.check(ctx.config.validity())?;
        let maturity = tracker.check(now.checked_add_signed(validity).ok_or_else(|| {
            PaperflowError::Configuration(format!(
                "validity_period puts maturity of paper issued at {now} out of range"
            ))
        }))?;
        let issued = amount.issued_by(ctx.me.reference(issue_ref));

        let stx = {
            tracker.enter(FlowStep::BuildProposal);
            let mut builder =
                TransactionBuilder::new(notary, ctx.resolver.as_ref(), ctx.attachments.as_ref());
            CommercialPaper::generate_issue(&mut builder, issued, maturity);

            tracker.enter(FlowStep::AttachProspectus);
            tracker.check(builder.add_attachment(ctx.config.prospectus_hash).map(|_| ()))?;

            tracker.enter(FlowStep::SetTimeWindow);
            let tolerance = tracker.check(ctx.config.tolerance())?;
            tracker.check(builder.set_time_window_duration(now, tolerance).map(|_| ()))?;

            driver::sign(ctx, tracker, &builder)?
        };

        driver::finalize(ctx, tracker, stx).await
    }
}
