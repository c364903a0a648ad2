//! End-to-end tests across all three planes.
//!
//! These tests run the full commercial paper lifecycle:
//! Assembly (builder) -> Coordination (flows) -> Finality (notary + vaults)
//!
//! They verify issuance and transfer on an in-process network of one issuer,
//! two recipients and a notary, plus every way a flow can fail: stale or
//! consumed inputs, missing prospectus, notary rejection, unreachable
//! participants, timeouts and malformed finality results.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use paperflow_builder::{InMemoryAttachmentStore, KeyStore, StateResolver};
use paperflow_finality::{FinalityProtocol, InMemoryLedger, InProcessFinality, Notary};
use paperflow_flows::{
    CommercialPaperIssueFlow, FlowContext, FlowTracker, IssuanceCoordinator, TransferCoordinator,
};
use paperflow_types::*;
use rust_decimal::Decimal;

const PROSPECTUS: &[u8] = b"Commercial paper prospectus: programme terms, risk factors, disclosures";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn usd(quantity: i64) -> Amount {
    Amount::new(Decimal::new(quantity, 0), "USD").unwrap()
}

fn issue_ref() -> OpaqueBytes {
    OpaqueBytes::from(vec![0x01])
}

/// Helper: an in-process network with one vault per party.
struct Network {
    clock: Arc<dyn Clock>,
    keys: Arc<KeyStore>,
    attachments: Arc<InMemoryAttachmentStore>,
    prospectus: SecureHash,
    issuer: Party,
    recipient: Party,
    recipient2: Party,
    notary: Party,
    issuer_vault: Arc<InMemoryLedger>,
    recipient_vault: Arc<InMemoryLedger>,
    recipient2_vault: Arc<InMemoryLedger>,
    finality: Arc<InProcessFinality>,
}

impl Network {
    fn new() -> Self {
        let net = Self::without_prospectus();
        assert_eq!(net.attachments.import(PROSPECTUS), net.prospectus);
        net
    }

    fn without_prospectus() -> Self {
        init_tracing();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(t0()));
        let keys = Arc::new(KeyStore::new());
        let issuer = keys.generate_identity("O=Bank of Paper, L=London, C=GB");
        let recipient = keys.generate_identity("O=Seller, L=New York, C=US");
        let recipient2 = keys.generate_identity("O=Buyer, L=Paris, C=FR");
        let notary = keys.generate_identity("O=Notary Service, L=Zurich, C=CH");

        let notary_node =
            Notary::new(notary.clone(), Arc::clone(&keys), Arc::clone(&clock)).unwrap();
        let finality = Arc::new(InProcessFinality::new(notary_node, Arc::clone(&clock)));
        let issuer_vault = Arc::new(InMemoryLedger::new(issuer.clone()));
        let recipient_vault = Arc::new(InMemoryLedger::new(recipient.clone()));
        let recipient2_vault = Arc::new(InMemoryLedger::new(recipient2.clone()));
        for vault in [&issuer_vault, &recipient_vault, &recipient2_vault] {
            finality.register_vault(Arc::clone(vault));
        }

        Self {
            clock,
            keys,
            attachments: Arc::new(InMemoryAttachmentStore::new()),
            prospectus: SecureHash::sha256(PROSPECTUS),
            issuer,
            recipient,
            recipient2,
            notary,
            issuer_vault,
            recipient_vault,
            recipient2_vault,
            finality,
        }
    }

    fn config(&self) -> FlowConfig {
        FlowConfig {
            prospectus_hash: self.prospectus,
            ..FlowConfig::default()
        }
    }

    fn context(&self, me: &Party, vault: &Arc<InMemoryLedger>) -> FlowContext {
        FlowContext::new(
            me.clone(),
            vault.clone(),
            self.attachments.clone(),
            self.keys.clone(),
            self.finality.clone(),
        )
        .with_clock(Arc::clone(&self.clock))
        .with_config(self.config())
        .unwrap()
    }

    fn issuer_context(&self) -> FlowContext {
        self.context(&self.issuer, &self.issuer_vault)
    }

    async fn issue(&self) -> FinalizedTransaction {
        IssuanceCoordinator::new(self.issuer_context())
            .issue(usd(1000), issue_ref(), &self.recipient, self.notary.clone())
            .await
            .expect("Issuance should finalise")
    }
}

/// A resolver frozen at one point in time; never learns about consumption.
struct Snapshot(HashMap<StateRef, InstrumentState>);

impl StateResolver for Snapshot {
    fn resolve(&self, state_ref: &StateRef) -> Option<InstrumentState> {
        self.0.get(state_ref).cloned()
    }
}

/// Never answers.
struct Stalled;

#[async_trait]
impl FinalityProtocol for Stalled {
    async fn finalize(&self, _stx: SignedTransaction) -> Result<Vec<FinalizedTransaction>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![])
    }
}

/// Answers with the submitted transaction `copies` times.
struct Echo {
    copies: usize,
}

#[async_trait]
impl FinalityProtocol for Echo {
    async fn finalize(&self, stx: SignedTransaction) -> Result<Vec<FinalizedTransaction>> {
        let sig = stx.signatures()[0].clone();
        let ftx = FinalizedTransaction::new(stx, sig, vec![], t0());
        Ok(vec![ftx; self.copies])
    }
}

// =============================================================================
// Test: Issue 1000 USD, then move it to a second recipient
// =============================================================================
#[tokio::test]
async fn e2e_issue_then_transfer() {
    let net = Network::new();

    let ctx = net.issuer_context();
    assert_eq!(ctx.me(), &net.issuer);
    let t1 = IssuanceCoordinator::new(ctx)
        .issue(usd(1000), issue_ref(), &net.recipient, net.notary.clone())
        .await
        .unwrap();
    assert_eq!(t1.finalized_at(), t0());

    assert_eq!(t1.outputs().len(), 1, "Issuance has exactly one output");
    let issued = t1.outputs()[0].clone();
    assert_eq!(issued.owner, net.issuer, "Issued paper is owned by the issuer");
    assert_eq!(issued.maturity_date, t0() + chrono::Duration::days(10));
    assert_eq!(issued.notary, net.notary);
    assert_eq!(issued.issued_amount.amount, usd(1000));
    assert_eq!(issued.issued_amount.issuer, net.issuer.reference(issue_ref()));

    let proposal = t1.proposal();
    assert_eq!(proposal.kind, TransactionKind::Issue);
    assert!(proposal.inputs.is_empty());
    assert_eq!(proposal.attachments, BTreeSet::from([net.prospectus]));
    let window = proposal.time_window.expect("Issuance must carry a time-window");
    assert_eq!(window.from_time(), t0());
    assert_eq!(window.until_time(), t0() + chrono::Duration::seconds(30));
    assert_eq!(proposal.required_signers, BTreeSet::from([net.issuer.clone()]));
    t1.signed().verify_signatures().unwrap();
    assert_eq!(t1.notary_signature().by, net.notary.owning_key);
    t1.notary_signature().verify(&t1.id()).unwrap();

    let t2 = TransferCoordinator::new(net.issuer_context())
        .transfer_previously_issued(&t1, net.recipient2.clone())
        .await
        .unwrap();

    let t1_out = StateRef::new(t1.id(), 0);
    assert_eq!(t2.proposal().kind, TransactionKind::Move);
    assert_eq!(t2.proposal().inputs, vec![t1_out]);
    assert_eq!(
        t2.outputs(),
        &[issued.with_new_owner(net.recipient2.clone())],
        "Only the owner changes"
    );
    assert_eq!(t2.outputs()[0].owner, net.recipient2);
    assert_eq!(t2.proposal().notary, net.notary);

    // T1's output is consumed everywhere that saw T2.
    assert!(net.issuer_vault.resolve(&t1_out).is_none());
    assert!(net.issuer_vault.is_consumed(&t1_out));
    assert!(net.finality.notary().is_consumed(&t1_out));
    assert_eq!(
        net.recipient2_vault.resolve(&StateRef::new(t2.id(), 0)),
        Some(t2.outputs()[0].clone())
    );
}

// =============================================================================
// Test: Issuance walks BUILDING -> SIGNED -> AWAITING_FINALITY -> FINALIZED
// =============================================================================
#[tokio::test]
async fn e2e_issuance_phases_and_progress() {
    let net = Network::new();
    let mut tracker = FlowTracker::new(FlowKind::Issuance);

    IssuanceCoordinator::new(net.issuer_context())
        .run(&mut tracker, usd(1000), issue_ref(), &net.recipient, net.notary.clone())
        .await
        .unwrap();

    assert_eq!(
        tracker.history(),
        &[
            FlowPhase::Building,
            FlowPhase::Signed,
            FlowPhase::AwaitingFinality,
            FlowPhase::Finalized,
        ]
    );
    assert_eq!(tracker.step(), FlowStep::CheckResult);
    assert_eq!(tracker.label(), Some(paperflow_types::constants::ISSUING_STEP_LABEL));
}

// =============================================================================
// Test: The combined flow issues, then hands the paper to the recipient
// =============================================================================
#[tokio::test]
async fn e2e_commercial_paper_issue_flow() {
    let net = Network::new();
    let mut flow = CommercialPaperIssueFlow::new(
        net.issuer_context(),
        usd(1000),
        issue_ref(),
        net.recipient.clone(),
        net.notary.clone(),
    );
    assert!(flow.progress().is_none());

    let moved = flow.call().await.unwrap();

    assert_eq!(flow.progress(), Some(paperflow_types::constants::MOVING_STEP_LABEL));
    let issuance = flow.issuance().expect("Issuance stage finalised");
    assert_eq!(moved.proposal().inputs, vec![StateRef::new(issuance.id(), 0)]);
    assert_eq!(moved.outputs()[0].owner, net.recipient);
    assert_eq!(
        net.recipient_vault.unconsumed_owned_by(&net.recipient),
        vec![StateRef::new(moved.id(), 0)]
    );
    assert!(net.issuer_vault.unconsumed_owned_by(&net.issuer).is_empty());
}

// =============================================================================
// Test: Transferring the same issuance twice never succeeds
// =============================================================================
#[tokio::test]
async fn e2e_transfer_twice_fails() {
    let net = Network::new();
    let t1 = net.issue().await;
    let transfer = TransferCoordinator::new(net.issuer_context());

    transfer
        .transfer_previously_issued(&t1, net.recipient2.clone())
        .await
        .unwrap();
    let err = transfer
        .transfer_previously_issued(&t1, net.recipient2.clone())
        .await
        .unwrap_err();

    assert!(
        matches!(err.kind(), PaperflowError::InvalidReference { .. }),
        "Expected InvalidReference, got: {err}"
    );
    assert_eq!(err.flow, FlowKind::Transfer);
    assert_eq!(err.step, FlowStep::ResolveInput);
    assert_eq!(net.recipient2_vault.transaction_count(), 1);
}

// =============================================================================
// Test: A stale view gets past the builder but the notary rejects it
// =============================================================================
#[tokio::test]
async fn e2e_stale_view_rejected_by_notary() {
    let net = Network::new();
    let t1 = net.issue().await;
    let t1_out = t1.out_ref(0).unwrap();
    let stale = Arc::new(Snapshot(HashMap::from([(t1_out.state_ref, t1_out.state)])));

    TransferCoordinator::new(net.issuer_context())
        .transfer_previously_issued(&t1, net.recipient2.clone())
        .await
        .unwrap();

    let mut tracker = FlowTracker::new(FlowKind::Transfer);
    let err = TransferCoordinator::new(net.issuer_context().with_resolver(stale))
        .run(&mut tracker, &t1, net.recipient.clone())
        .await
        .unwrap_err();

    assert!(
        matches!(err.kind(), PaperflowError::Rejected { reason } if reason.contains("double spend")),
        "Expected double-spend rejection, got: {err}"
    );
    assert_eq!(err.step, FlowStep::Finalize);
    assert_eq!(tracker.phase(), FlowPhase::Failed);

    // No ledger effect: the paper still belongs to the first buyer.
    assert_eq!(net.recipient_vault.transaction_count(), 0);
    assert_eq!(net.recipient2_vault.unconsumed_owned_by(&net.recipient2).len(), 1);
}

// =============================================================================
// Test: Missing prospectus fails before signing, with no ledger effect
// =============================================================================
#[tokio::test]
async fn e2e_missing_prospectus_has_no_ledger_effect() {
    let net = Network::without_prospectus();
    let mut tracker = FlowTracker::new(FlowKind::Issuance);

    let err = IssuanceCoordinator::new(net.issuer_context())
        .run(&mut tracker, usd(1000), issue_ref(), &net.recipient, net.notary.clone())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), &PaperflowError::AttachmentNotFound(net.prospectus));
    assert_eq!(err.step, FlowStep::AttachProspectus);
    assert_eq!(tracker.history(), &[FlowPhase::Building, FlowPhase::Failed]);
    assert_eq!(net.issuer_vault.transaction_count(), 0);
    assert_eq!(net.recipient_vault.transaction_count(), 0);
}

// =============================================================================
// Test: Without an override, the well-known prospectus hash is required
// =============================================================================
#[tokio::test]
async fn e2e_default_prospectus_must_be_in_store() {
    let net = Network::new();
    let ctx = net
        .issuer_context()
        .with_config(FlowConfig::default())
        .unwrap();

    let err = IssuanceCoordinator::new(ctx)
        .issue(usd(1000), issue_ref(), &net.recipient, net.notary.clone())
        .await
        .unwrap_err();

    let expected = SecureHash::parse(paperflow_types::constants::PROSPECTUS_HASH_HEX).unwrap();
    assert_eq!(err.kind(), &PaperflowError::AttachmentNotFound(expected));
}

// =============================================================================
// Test: Moving to a party with no reachable vault is rejected, nothing consumed
// =============================================================================
#[tokio::test]
async fn e2e_unreachable_recipient_rejected() {
    let net = Network::new();
    let t1 = net.issue().await;
    let stranger = net.keys.generate_identity("O=Unknown, L=Nowhere, C=XX");

    let err = TransferCoordinator::new(net.issuer_context())
        .transfer_previously_issued(&t1, stranger)
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), PaperflowError::Rejected { .. }));
    assert_eq!(err.step, FlowStep::Finalize);
    let t1_out = StateRef::new(t1.id(), 0);
    assert!(!net.finality.notary().is_consumed(&t1_out));
    assert!(net.issuer_vault.resolve(&t1_out).is_some());
}

// =============================================================================
// Test: Only the current owner can move the paper
// =============================================================================
#[tokio::test]
async fn e2e_transfer_by_non_owner_fails_at_signing() {
    let net = Network::new();
    let t1 = net.issue().await;
    // The recipient can see the issuer's vault but cannot sign for the issuer.
    let ctx = net.context(&net.recipient, &net.issuer_vault);

    let err = TransferCoordinator::new(ctx)
        .transfer_previously_issued(&t1, net.recipient.clone())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), PaperflowError::Signing { .. }));
    assert_eq!(err.step, FlowStep::Sign);
    assert!(!net.finality.notary().is_consumed(&StateRef::new(t1.id(), 0)));
}

// =============================================================================
// Test: A finality exchange that never answers times out
// =============================================================================
#[tokio::test]
async fn e2e_finality_timeout() {
    let net = Network::new();
    let config = FlowConfig {
        finality_timeout: Duration::from_millis(50),
        ..net.config()
    };
    let ctx = net
        .issuer_context()
        .with_finality(Arc::new(Stalled))
        .with_config(config)
        .unwrap();
    let mut tracker = FlowTracker::new(FlowKind::Issuance);

    let err = IssuanceCoordinator::new(ctx)
        .run(&mut tracker, usd(1000), issue_ref(), &net.recipient, net.notary.clone())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), &PaperflowError::Timeout { after_ms: 50 });
    assert_eq!(err.step, FlowStep::Finalize);
    assert_eq!(
        tracker.history(),
        &[
            FlowPhase::Building,
            FlowPhase::Signed,
            FlowPhase::AwaitingFinality,
            FlowPhase::Failed,
        ]
    );
    assert_eq!(net.issuer_vault.transaction_count(), 0);
}

// =============================================================================
// Test: Zero or several finalised transactions is a protocol violation
// =============================================================================
#[tokio::test]
async fn e2e_wrong_result_count_is_protocol_violation() {
    let net = Network::new();

    for copies in [0, 2] {
        let ctx = net
            .issuer_context()
            .with_finality(Arc::new(Echo { copies }));
        let err = IssuanceCoordinator::new(ctx)
            .issue(usd(1000), issue_ref(), &net.recipient, net.notary.clone())
            .await
            .unwrap_err();

        assert!(
            matches!(err.kind(), PaperflowError::ProtocolViolation { .. }),
            "{copies} results: got {err}"
        );
        assert_eq!(err.step, FlowStep::CheckResult);
    }
}

// =============================================================================
// Test: Independent issuances run concurrently without interfering
// =============================================================================
#[tokio::test]
async fn e2e_concurrent_issuances() {
    let net = Network::new();
    let ctx = net.issuer_context();
    let first = IssuanceCoordinator::new(ctx.clone());
    let second = IssuanceCoordinator::new(ctx);

    let (a, b) = tokio::join!(
        first.issue(usd(1000), OpaqueBytes::from(vec![0x01]), &net.recipient, net.notary.clone()),
        second.issue(usd(500), OpaqueBytes::from(vec![0x02]), &net.recipient, net.notary.clone()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.id(), b.id());
    assert!(
        !a.outputs()[0]
            .issued_amount
            .is_fungible_with(&b.outputs()[0].issued_amount),
        "Different issue refs are not fungible"
    );
    assert_eq!(net.issuer_vault.transaction_count(), 2);
    assert_eq!(net.issuer_vault.unconsumed_owned_by(&net.issuer).len(), 2);
}
