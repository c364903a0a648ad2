//! Steps shared by both coordinators: sign, then drive to finality.

use paperflow_builder::TransactionBuilder;
use paperflow_types::{
    FinalizedTransaction, FlowError, FlowPhase, FlowStep, PaperflowError, SignedTransaction,
};

use crate::context::FlowContext;
use crate::tracker::FlowTracker;

/// Snapshot the builder, sign as the local party and move to SIGNED.
///
/// A signature missing for any other required signer fails here with
/// `Signing` rather than at the notary.
pub(crate) fn sign(
    ctx: &FlowContext,
    tracker: &mut FlowTracker,
    builder: &TransactionBuilder<'_>,
) -> Result<SignedTransaction, FlowError> {
    tracker.enter(FlowStep::Sign);
    let proposal = tracker.check(builder.build())?;
    let signature = tracker.check(ctx.signer.sign(&proposal, &ctx.me))?;
    let stx = SignedTransaction::new(proposal, vec![signature]);
    tracker.check(stx.verify_signatures())?;
    tracker.advance(FlowPhase::Signed)?;
    tracing::debug!(flow_id = %tracker.id(), tx = %stx.id().short(), "proposal signed");
    Ok(stx)
}

/// Submit `stx` and suspend until the finality protocol answers or
/// `finality_timeout` elapses. Exactly one transaction, with the submitted
/// id, must come back.
pub(crate) async fn finalize(
    ctx: &FlowContext,
    tracker: &mut FlowTracker,
    stx: SignedTransaction,
) -> Result<FinalizedTransaction, FlowError> {
    tracker.enter(FlowStep::Finalize);
    tracker.advance(FlowPhase::AwaitingFinality)?;

    let tx_id = stx.id();
    let limit = ctx.config.finality_timeout;
    let outcome = match tokio::time::timeout(limit, ctx.finality.finalize(stx)).await {
        Ok(result) => result,
        Err(_) => Err(PaperflowError::Timeout {
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    };
    let mut finalized = tracker.check(outcome)?;

    tracker.enter(FlowStep::CheckResult);
    let count = finalized.len();
    let ftx = match finalized.pop() {
        Some(ftx) if finalized.is_empty() => ftx,
        _ => {
            return Err(tracker.fail(PaperflowError::ProtocolViolation {
                reason: format!("expected exactly one finalised transaction, got {count}"),
            }));
        }
    };
    if ftx.id() != tx_id {
        return Err(tracker.fail(PaperflowError::ProtocolViolation {
            reason: format!("submitted tx {tx_id}, finality returned {}", ftx.id()),
        }));
    }

    tracker.advance(FlowPhase::Finalized)?;
    tracing::info!(
        flow_id = %tracker.id(),
        flow = %tracker.kind(),
        tx = %tx_id.short(),
        "transaction finalised"
    );
    Ok(ftx)
}
