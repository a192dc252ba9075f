use std::{sync::Arc, time::Duration};

use synapse_client::prelude::*;
use test_network::MockChain;
use tokio::time::{sleep, Instant};

use crate::{alice, weights, WAIT_FOR_INCLUSION};

fn params() -> SubmissionParameters {
    SubmissionParameters::new(NetUid(1)).with_finalization(true)
}

#[tokio::test]
async fn slow_weight_submission_times_out_and_is_cancelled() {
    let chain = Arc::new(MockChain::new().with_submit_delay(Duration::from_secs(2)));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let start = Instant::now();
    let outcome = orchestrator
        .set_weights_with_ttl(
            &weights(&[(1, 1.0)]),
            &params(),
            Some(Duration::from_secs(1)),
        )
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome, CallOutcome::Submitted(SubmissionOutcome::TimedOut));
    assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
    assert_eq!(chain.submission_count(), 1);

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(chain.completed_submission_count(), 0);
}

#[tokio::test]
async fn fast_submission_within_ttl_is_confirmed() {
    let chain = Arc::new(MockChain::new().with_submit_delay(Duration::from_millis(50)));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let outcome = orchestrator
        .set_weights_with_ttl(
            &weights(&[(1, 1.0)]),
            &params(),
            Some(Duration::from_secs(2)),
        )
        .await
        .unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(chain.completed_submission_count(), 1);
}

#[tokio::test]
async fn default_ttl_applies_when_none_given() {
    let chain = Arc::new(MockChain::new());
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let outcome = orchestrator
        .set_weights_with_ttl(&weights(&[(1, 1.0)]), &params(), None)
        .await
        .unwrap();
    assert!(outcome.is_confirmed());
}

#[tokio::test]
async fn deadline_in_parameters_guards_registration() {
    let chain = Arc::new(MockChain::new().with_submit_delay(Duration::from_secs(2)));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));
    let params = SubmissionParameters::new(NetUid::ROOT)
        .with_inclusion(true)
        .with_deadline(Duration::from_millis(300));

    let outcome = orchestrator.register(&alice(), &params).await.unwrap();
    assert_eq!(outcome, CallOutcome::Submitted(SubmissionOutcome::TimedOut));

    sleep(Duration::from_secs(2)).await;
    assert!(!chain.registered_now(NetUid::ROOT, &alice()));
    assert_eq!(chain.completed_submission_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_client_is_timed_out_on_multi_thread_runtime() {
    let chain = Arc::new(MockChain::new().with_blocking_submit(Duration::from_secs(2)));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let start = Instant::now();
    let outcome = orchestrator
        .set_weights_with_ttl(
            &weights(&[(1, 1.0)]),
            &params(),
            Some(Duration::from_secs(1)),
        )
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome, CallOutcome::Submitted(SubmissionOutcome::TimedOut));
    assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
}

#[tokio::test]
async fn blocking_client_is_timed_out_on_current_thread_runtime() {
    let chain = Arc::new(MockChain::new().with_blocking_submit(Duration::from_secs(2)));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let start = Instant::now();
    let outcome = orchestrator
        .set_weights_with_ttl(
            &weights(&[(1, 1.0)]),
            &params(),
            Some(Duration::from_secs(1)),
        )
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome, CallOutcome::Submitted(SubmissionOutcome::TimedOut));
    assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
}

#[test]
fn blocking_client_is_timed_out_by_blocking_wrapper() {
    let chain = Arc::new(MockChain::new().with_blocking_submit(Duration::from_secs(2)));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let start = std::time::Instant::now();
    let outcome = orchestrator
        .set_weights_with_ttl_blocking(
            &weights(&[(1, 1.0)]),
            &params(),
            Some(Duration::from_secs(1)),
        )
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome, CallOutcome::Submitted(SubmissionOutcome::TimedOut));
    assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
    assert_eq!(chain.submission_count(), 1);
}

#[tokio::test]
async fn late_registration_of_blocking_client_is_timed_out() {
    let chain = Arc::new(MockChain::new().with_blocking_submit(Duration::from_millis(800)));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate
        .register(
            &alice(),
            WAIT_FOR_INCLUSION,
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap();
    assert_eq!(outcome, SubmissionOutcome::TimedOut);

    // delivery is unknown at the deadline; the detached worker may still land it
    sleep(Duration::from_secs(1)).await;
    assert!(chain.registered_now(NetUid::ROOT, &alice()));
    assert_eq!(chain.completed_submission_count(), 1);
}
