use std::sync::Arc;

use parking_lot::Mutex;
use synapse_client::prelude::*;
use test_network::MockChain;

use crate::{weights, Recorder};

const NETUID: NetUid = NetUid(1);

fn params() -> SubmissionParameters {
    SubmissionParameters::new(NETUID)
        .with_version_key(7)
        .with_inclusion(true)
}

fn emitted(chain: &MockChain) -> Vec<(Uid, u16)> {
    let submissions = chain.submissions();
    let [(Extrinsic::SetWeights { weights, .. }, _)] = submissions.as_slice() else {
        panic!("expected exactly one weight submission, got {submissions:?}");
    };
    weights.iter().map(|w| (w.uid(), w.value())).collect()
}

#[tokio::test]
async fn weights_are_filtered_normalized_and_confirmed() {
    let chain = Arc::new(MockChain::new());
    let recorder = Recorder::default();
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain)).with_sink(recorder.clone());

    let outcome = orchestrator
        .set_weights(&weights(&[(10, 1.0), (20, 3.0), (30, 0.0)]), &params())
        .await
        .unwrap();

    assert_eq!(outcome, CallOutcome::Submitted(SubmissionOutcome::Confirmed));
    assert_eq!(emitted(&chain), vec![(10, 21845), (20, 65535)]);
    let (call, wait) = &chain.submissions()[0];
    assert_eq!(call.netuid(), NETUID);
    assert!(matches!(call, Extrinsic::SetWeights { version_key: 7, .. }));
    assert!(wait.inclusion && !wait.finalization);
    assert_eq!(
        recorder.events(),
        vec![
            "prepared 2 weights for network 1",
            "submitting set_weights on network 1",
            "set_weights: confirmed",
        ]
    );
}

#[tokio::test]
async fn too_few_weights_are_rejected_before_submission() {
    let chain = Arc::new(MockChain::new().with_param(ChainParam::MinAllowedWeights, NETUID, 3.0));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let error = orchestrator
        .set_weights(&weights(&[(1, 0.0), (2, 0.5), (3, 0.5)]), &params())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        Error::InsufficientWeights {
            required: 3,
            actual: 2
        }
    ));
    assert_eq!(chain.submission_count(), 0);
}

#[tokio::test]
async fn out_of_range_chain_params_are_query_errors() {
    for (param, value) in [
        (ChainParam::MaxWeightLimit, 1.5),
        (ChainParam::MaxWeightLimit, 0.0),
        (ChainParam::MinAllowedWeights, 2.5),
        (ChainParam::MinAllowedWeights, -1.0),
    ] {
        let chain = Arc::new(MockChain::new().with_param(param, NETUID, value));
        let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

        let error = orchestrator
            .set_weights(&weights(&[(1, 1.0)]), &params())
            .await
            .unwrap_err();
        assert!(
            matches!(
                error,
                Error::ChainQuery(ChainQueryError::ParamOutOfRange { param: p, .. }) if p == param
            ),
            "{param} = {value}: {error:?}"
        );
        assert_eq!(chain.submission_count(), 0);
    }
}

#[tokio::test]
async fn max_weight_limit_is_queried_on_target_network() {
    let chain = Arc::new(MockChain::new().with_param(ChainParam::MaxWeightLimit, NetUid(5), 0.25));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let outcome = orchestrator
        .set_weights(&weights(&[(1, 0.5), (2, 1.0)]), &params().on(NetUid(5)))
        .await
        .unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(chain.param_query_count(), 2);
    assert_eq!(emitted(&chain), vec![(1, 32768), (2, 65535)]);
}

#[tokio::test]
async fn chain_rejection_carries_message() {
    let chain = Arc::new(MockChain::new().respond_with(Receipt::declined("stale version key")));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let outcome = orchestrator
        .set_weights(&weights(&[(1, 1.0)]), &params())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CallOutcome::Submitted(SubmissionOutcome::rejected("stale version key"))
    );
}

#[tokio::test]
async fn not_waiting_is_unconfirmed() {
    let chain = Arc::new(MockChain::new());
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let outcome = orchestrator
        .set_weights(&weights(&[(1, 1.0)]), &params().with_inclusion(false))
        .await
        .unwrap();
    assert_eq!(outcome, CallOutcome::Submitted(SubmissionOutcome::Unconfirmed));
    assert_eq!(chain.submission_count(), 1);
}

#[tokio::test]
async fn transport_failure_is_an_error() {
    let chain = Arc::new(MockChain::new().fail_transport_with("broken pipe"));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let error = orchestrator
        .set_weights(&weights(&[(1, 1.0)]), &params())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        Error::Transport(TransportError::ConnectionDropped(_))
    ));
}

#[tokio::test]
async fn declined_confirmation_aborts_after_showing_weights() {
    let chain = Arc::new(MockChain::new());
    let shown = Arc::new(Mutex::new(None));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain)).with_confirm({
        let shown = Arc::clone(&shown);
        move |request: &ConfirmationRequest<'_>| {
            *shown.lock() = Some(request.to_string());
            false
        }
    });

    let outcome = orchestrator
        .set_weights(&weights(&[(2, 1.0), (1, 0.5)]), &params().with_prompt(true))
        .await
        .unwrap();

    assert_eq!(outcome, CallOutcome::Aborted);
    assert_eq!(chain.submission_count(), 0);
    assert_eq!(
        shown.lock().as_deref(),
        Some("Set weights on network 1?\n  uid 1: 0.500008\n  uid 2: 1.000000\n")
    );
}

#[tokio::test]
async fn prompt_is_not_shown_unless_requested() {
    let chain = Arc::new(MockChain::new());
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain))
        .with_confirm(|_: &ConfirmationRequest<'_>| false);

    let outcome = orchestrator
        .set_weights(&weights(&[(1, 1.0)]), &params())
        .await
        .unwrap();
    assert!(outcome.is_confirmed());
}

#[tokio::test]
async fn root_weights_target_network_zero() {
    let chain = Arc::new(MockChain::new());
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let outcome = orchestrator
        .set_root_weights(&weights(&[(0, 0.2), (3, 0.8)]), &params())
        .await
        .unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(chain.submissions()[0].0.netuid(), NetUid::ROOT);
    assert_eq!(emitted(&chain), vec![(0, 16384), (3, 65535)]);
}
