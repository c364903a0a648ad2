//! Issue commercial paper and hand it to a recipient in one flow.

use paperflow_types::{
    Amount, FinalizedTransaction, FlowError, FlowKind, OpaqueBytes, Party, constants,
};

use crate::context::FlowContext;
use crate::issuance::IssuanceCoordinator;
use crate::tracker::FlowTracker;
use crate::transfer::TransferCoordinator;

/// Issues paper owned by the local party, then moves it to `recipient`.
///
/// Returns the move. The issuance stays available through
/// [`Self::issuance`] once the first stage has finalised.
#[derive(Debug)]
pub struct CommercialPaperIssueFlow {
    ctx: FlowContext,
    amount: Amount,
    issue_ref: OpaqueBytes,
    recipient: Party,
    notary: Party,
    progress: Option<&'static str>,
    issuance: Option<FinalizedTransaction>,
}

impl CommercialPaperIssueFlow {
    #[must_use]
    pub fn new(
        ctx: FlowContext,
        amount: Amount,
        issue_ref: OpaqueBytes,
        recipient: Party,
        notary: Party,
    ) -> Self {
        Self {
            ctx,
            amount,
            issue_ref,
            recipient,
            notary,
            progress: None,
            issuance: None,
        }
    }

    /// The stage currently (or last) running.
    #[must_use]
    pub fn progress(&self) -> Option<&'static str> {
        self.progress
    }

    #[must_use]
    pub fn issuance(&self) -> Option<&FinalizedTransaction> {
        self.issuance.as_ref()
    }

    /// Run both stages. A failed issuance never reaches the move.
    pub async fn call(&mut self) -> Result<FinalizedTransaction, FlowError> {
        self.progress = Some(constants::ISSUING_STEP_LABEL);
        let mut tracker = FlowTracker::new(FlowKind::Issuance);
        let issuance = IssuanceCoordinator::new(self.ctx.clone())
            .run(
                &mut tracker,
                self.amount.clone(),
                self.issue_ref.clone(),
                &self.recipient,
                self.notary.clone(),
            )
            .await?;
        let issuance = self.issuance.insert(issuance);

        self.progress = Some(constants::MOVING_STEP_LABEL);
        let mut tracker = FlowTracker::new(FlowKind::Transfer);
        TransferCoordinator::new(self.ctx.clone())
            .run(&mut tracker, issuance, self.recipient.clone())
            .await
    }
}
