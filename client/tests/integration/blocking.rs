use std::{sync::Arc, time::Duration};

use synapse_client::prelude::*;
use test_network::MockChain;

use crate::{alice, weights};

#[test]
fn blocking_calls_run_without_a_runtime() {
    let chain = Arc::new(MockChain::new());
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));
    let params = SubmissionParameters::new(NetUid(1)).with_inclusion(true);

    let registered = orchestrator.register_blocking(&alice(), &params).unwrap();
    let again = orchestrator.register_blocking(&alice(), &params).unwrap();
    assert!(registered.is_confirmed() && again.is_confirmed());

    let subnet = orchestrator
        .set_weights_blocking(&weights(&[(1, 1.0), (2, 0.5)]), &params)
        .unwrap();
    let root = orchestrator
        .set_root_weights_blocking(&weights(&[(1, 1.0)]), &params)
        .unwrap();
    assert!(subnet.is_confirmed() && root.is_confirmed());

    let netuids: Vec<_> = chain
        .submissions()
        .iter()
        .map(|(call, _)| (call.kind(), call.netuid()))
        .collect();
    assert_eq!(
        netuids,
        vec![
            (ExtrinsicKind::Register, NetUid::ROOT),
            (ExtrinsicKind::SetWeights, NetUid(1)),
            (ExtrinsicKind::SetWeights, NetUid::ROOT),
        ]
    );
}

#[test]
fn blocking_call_honours_deadline() {
    let chain = Arc::new(MockChain::new().with_submit_delay(Duration::from_secs(2)));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));
    let params = SubmissionParameters::new(NetUid(1)).with_inclusion(true);

    let outcome = orchestrator
        .set_weights_with_ttl_blocking(
            &weights(&[(1, 1.0)]),
            &params,
            Some(Duration::from_millis(200)),
        )
        .unwrap();
    assert_eq!(outcome, CallOutcome::Submitted(SubmissionOutcome::TimedOut));
    assert_eq!(chain.completed_submission_count(), 0);
}
