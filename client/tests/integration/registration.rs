use std::{sync::Arc, time::Duration};

use synapse_client::{prelude::*, registration::REGISTRATION_NOT_OBSERVED};
use test_network::MockChain;

use crate::{alice, Recorder, WAIT_FOR_INCLUSION};

fn params() -> SubmissionParameters {
    SubmissionParameters::new(NetUid::ROOT).with_inclusion(true)
}

#[tokio::test]
async fn registered_participant_is_not_submitted_again() {
    let chain = Arc::new(MockChain::new().with_registered(NetUid::ROOT, alice()));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate.register(&alice(), WAIT_FOR_INCLUSION, None).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Confirmed);
    assert_eq!(chain.submission_count(), 0);
}

#[tokio::test]
async fn registering_twice_submits_once() {
    let chain = Arc::new(MockChain::new());
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    for _ in 0..2 {
        let outcome = orchestrator.register(&alice(), &params()).await.unwrap();
        assert!(outcome.is_confirmed());
    }
    assert_eq!(chain.submission_count(), 1);
    assert_eq!(
        chain.submissions()[0].0,
        Extrinsic::Register {
            netuid: NetUid::ROOT,
            participant: alice(),
        }
    );
}

#[tokio::test]
async fn claimed_success_without_status_is_rejected() {
    let chain = Arc::new(MockChain::new().registering_on_submit(false));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate.register(&alice(), WAIT_FOR_INCLUSION, None).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::rejected(REGISTRATION_NOT_OBSERVED));
}

#[tokio::test]
async fn reported_failure_with_positive_status_is_confirmed() {
    let chain = Arc::new(
        MockChain::new()
            .respond_with(Receipt::declined("priority too low"))
            .registering_on_submit(true),
    );
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate.register(&alice(), WAIT_FOR_INCLUSION, None).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Confirmed);
}

#[tokio::test]
async fn declined_registration_carries_message() {
    let chain =
        Arc::new(MockChain::new().respond_with(Receipt::declined("too many registrations")));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate.register(&alice(), WAIT_FOR_INCLUSION, None).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::rejected("too many registrations"));
}

#[tokio::test]
async fn declined_registration_is_rejected_without_waiting() {
    let chain =
        Arc::new(MockChain::new().respond_with(Receipt::declined("too many registrations")));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate.register(&alice(), WaitFor::NOTHING, None).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::rejected("too many registrations"));
    assert!(!chain.registered_now(NetUid::ROOT, &alice()));
}

#[tokio::test]
async fn declined_registration_without_message_is_rejected() {
    let chain = Arc::new(MockChain::new().respond_with(Receipt::declined("")));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate.register(&alice(), WaitFor::NOTHING, None).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::rejected("registration declined"));
}

#[tokio::test]
async fn fire_and_forget_registration_is_unconfirmed() {
    let chain = Arc::new(MockChain::new().registering_on_submit(false));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate.register(&alice(), WaitFor::NOTHING, None).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Unconfirmed);
}

#[tokio::test]
async fn timed_out_registration_rechecks_status_after_termination() {
    let chain = Arc::new(MockChain::new().with_submit_delay(Duration::from_secs(2)));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let outcome = gate
        .register(&alice(), WAIT_FOR_INCLUSION, Some(Duration::from_millis(200)))
        .await
        .unwrap();
    assert_eq!(outcome, SubmissionOutcome::TimedOut);
    assert_eq!(chain.submission_count(), 1);
    assert_eq!(chain.completed_submission_count(), 0);
    assert_eq!(chain.status_query_count(), 2);
    assert!(!chain.registered_now(NetUid::ROOT, &alice()));
}

#[tokio::test]
async fn transport_failure_is_an_error_when_not_registered() {
    let chain = Arc::new(MockChain::new().fail_transport_with("connection reset"));
    let gate = RegistrationGate::new(Arc::clone(&chain));

    let error = gate
        .register(&alice(), WAIT_FOR_INCLUSION, None)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Transport(_)));
}

#[tokio::test]
async fn unreachable_chain_is_a_query_error() {
    let chain = Arc::new(MockChain::new().unreachable("connection refused"));
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain));

    let error = orchestrator.register(&alice(), &params()).await.unwrap_err();
    assert!(matches!(
        error,
        Error::ChainQuery(ChainQueryError::Unreachable(_))
    ));
    assert_eq!(chain.submission_count(), 0);
}

#[tokio::test]
async fn declined_confirmation_aborts_without_submitting() {
    let chain = Arc::new(MockChain::new());
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain))
        .with_confirm(|_: &ConfirmationRequest<'_>| false);

    let outcome = orchestrator
        .register(&alice(), &params().with_prompt(true))
        .await
        .unwrap();
    assert_eq!(outcome, CallOutcome::Aborted);
    assert_eq!(chain.submission_count(), 0);
}

#[tokio::test]
async fn already_registered_skips_confirmation() {
    let chain = Arc::new(MockChain::new().with_registered(NetUid::ROOT, alice()));
    let recorder = Recorder::default();
    let orchestrator = ExtrinsicOrchestrator::new(Arc::clone(&chain))
        .with_confirm(|_: &ConfirmationRequest<'_>| -> bool { panic!("must not be asked") })
        .with_sink(recorder.clone());

    let outcome = orchestrator
        .register(&alice(), &params().with_prompt(true))
        .await
        .unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(
        recorder.events(),
        vec![
            format!("{} is already registered", alice()),
            "register: confirmed".to_owned(),
        ]
    );
}
