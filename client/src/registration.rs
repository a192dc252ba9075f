//! Registration is a one-time side effect. The gate checks chain state before
//! submitting, so a repeated call never submits twice, and checks it again
//! afterwards, because the chain client's own answer is not authoritative.

use std::{sync::Arc, time::Duration};

use synapse_data_model::prelude::*;
use synapse_logger::prelude::*;

use crate::{
    chain::{self, ExtrinsicClient},
    deadline::Guarded,
    Error,
};

/// Rejection message for a registration the client reported as successful
/// but which is not visible on chain.
pub const REGISTRATION_NOT_OBSERVED: &str = "registration not observed on chain";

/// Idempotent registration on the root network.
#[derive(Debug)]
pub struct RegistrationGate<C: ?Sized> {
    client: Arc<C>,
}

impl<C: ?Sized> Clone for RegistrationGate<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: ExtrinsicClient + ?Sized + 'static> RegistrationGate<C> {
    /// Gate over `client`.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Whether `participant` is already registered on the root network.
    ///
    /// # Errors
    /// If the chain cannot be queried.
    pub async fn is_registered(&self, participant: &ParticipantKey) -> Result<bool, Error> {
        Ok(self
            .client
            .is_registered(NetUid::ROOT, participant)
            .await?)
    }

    /// Register `participant`, unless it already is.
    ///
    /// # Errors
    /// See [`Self::submit_and_verify`].
    pub async fn register(
        &self,
        participant: &ParticipantKey,
        wait: WaitFor,
        deadline: Option<Duration>,
    ) -> Result<SubmissionOutcome, Error> {
        if self.is_registered(participant).await? {
            info!(%participant, "Already registered");
            return Ok(SubmissionOutcome::Confirmed);
        }
        self.submit_and_verify(participant, wait, deadline).await
    }

    /// Submit the registration and classify it by the status observed on
    /// chain afterwards.
    ///
    /// The status is queried once after the submission returns or its
    /// deadline elapses, whatever the chain client reported.
    /// A positive status always means [`SubmissionOutcome::Confirmed`].
    /// Otherwise:
    /// - a timed out submission is [`SubmissionOutcome::TimedOut`]
    /// - a declined submission is [`SubmissionOutcome::Rejected`] with the
    ///   chain's message, waited for or not
    /// - an accepted submission which did not wait is [`SubmissionOutcome::Unconfirmed`]
    /// - an accepted submission which waited is [`SubmissionOutcome::Rejected`]
    ///
    /// The status query may lag behind the chain, so a rejection here can be
    /// a false negative.
    ///
    /// # Errors
    /// - The status cannot be queried
    /// - The extrinsic could not be delivered and the participant is not registered
    /// - The submission worker panicked and the participant is not registered
    #[log(skip_all, fields(%participant))]
    pub async fn submit_and_verify(
        &self,
        participant: &ParticipantKey,
        wait: WaitFor,
        deadline: Option<Duration>,
    ) -> Result<SubmissionOutcome, Error> {
        let call = Extrinsic::Register {
            netuid: NetUid::ROOT,
            participant: participant.clone(),
        };
        let submission = chain::submit(&self.client, call, wait, deadline).await;

        if self.is_registered(participant).await? {
            if let Err(error) = &submission {
                warn!(%error, "Submission failed but the participant is registered");
            }
            return Ok(SubmissionOutcome::Confirmed);
        }

        let outcome = match submission? {
            Guarded::TimedOut => SubmissionOutcome::TimedOut,
            Guarded::Completed(receipt) if !receipt.success && receipt.message.is_empty() => {
                SubmissionOutcome::rejected("registration declined")
            }
            Guarded::Completed(receipt) if !receipt.success => {
                SubmissionOutcome::rejected(receipt.message)
            }
            Guarded::Completed(_) if !wait.is_waiting() => SubmissionOutcome::Unconfirmed,
            Guarded::Completed(_) => SubmissionOutcome::rejected(REGISTRATION_NOT_OBSERVED),
        };
        debug!(%outcome, "Registration status checked");
        Ok(outcome)
    }
}
