//! [`ExtrinsicOrchestrator`] runs one call at a time through
//! `prepare -> confirm -> submit -> classify` and reports what it knows
//! about the extrinsic as a [`CallOutcome`].

use std::{fmt, future::Future, sync::Arc, time::Duration};

use synapse_config::defaults::submission::DEFAULT_TTL;
use synapse_data_model::prelude::*;
use synapse_logger::prelude::*;

use crate::{
    chain::{self, ChainQueryError, ExtrinsicClient},
    deadline::Guarded,
    registration::RegistrationGate,
    weights::{prepare_weights, PreparedWeights},
    Error,
};

/// What the user is asked to confirm.
#[derive(Debug, Clone, Copy)]
pub enum ConfirmationRequest<'a> {
    /// Registration of `participant` on the root network
    Register {
        /// Participant to register
        participant: &'a ParticipantKey,
    },
    /// Setting `weights` on `netuid`
    SetWeights {
        /// Target network
        netuid: NetUid,
        /// Weights about to be emitted
        weights: &'a [FixedPointWeight],
    },
}

impl fmt::Display for ConfirmationRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register { participant } => {
                write!(f, "Register {participant} on the root network?")
            }
            Self::SetWeights { netuid, weights } => {
                writeln!(f, "Set weights on network {netuid}?")?;
                for weight in *weights {
                    writeln!(f, "  uid {}: {:.6}", weight.uid(), weight.as_fraction())?;
                }
                Ok(())
            }
        }
    }
}

/// Decides whether a prepared call proceeds.
pub trait Confirm: Send + Sync {
    /// `true` to submit, `false` to abort with no side effect.
    fn confirm(&self, request: &ConfirmationRequest<'_>) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&ConfirmationRequest<'_>) -> bool + Send + Sync,
{
    fn confirm(&self, request: &ConfirmationRequest<'_>) -> bool {
        self(request)
    }
}

/// Confirms every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _request: &ConfirmationRequest<'_>) -> bool {
        true
    }
}

/// Progress of an orchestrated call.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// Registration was skipped
    AlreadyRegistered {
        /// Registered participant
        participant: &'a ParticipantKey,
    },
    /// Weights went through filtering, normalization and encoding
    WeightsPrepared {
        /// Target network
        netuid: NetUid,
        /// Preparation stages
        prepared: &'a PreparedWeights,
    },
    /// Extrinsic is being handed to the chain client
    Submitting {
        /// Kind of the extrinsic
        kind: ExtrinsicKind,
        /// Target network
        netuid: NetUid,
    },
    /// Call returned
    Finished {
        /// Kind of the extrinsic
        kind: ExtrinsicKind,
        /// Final outcome
        outcome: &'a CallOutcome,
    },
}

impl fmt::Display for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRegistered { participant } => write!(f, "{participant} is already registered"),
            Self::WeightsPrepared { netuid, prepared } => write!(
                f,
                "prepared {} weights for network {netuid}",
                prepared.emitted.len()
            ),
            Self::Submitting { kind, netuid } => write!(f, "submitting {kind} on network {netuid}"),
            Self::Finished { kind, outcome } => write!(f, "{kind}: {outcome}"),
        }
    }
}

/// Receives [`Progress`] of orchestrated calls.
pub trait ProgressSink: Send + Sync {
    /// Called at every step of a call.
    fn report(&self, progress: &Progress<'_>);
}

impl<F> ProgressSink for F
where
    F: Fn(&Progress<'_>) + Send + Sync,
{
    fn report(&self, progress: &Progress<'_>) {
        self(progress);
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn report(&self, _progress: &Progress<'_>) {}
}

/// Logs progress at `INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&self, progress: &Progress<'_>) {
        info!(%progress);
    }
}

/// Composes weight preparation, confirmation, registration and submission.
///
/// Calls are independent: nothing is shared between them except the chain
/// client, so concurrent calls on separate orchestrators, or on one behind an
/// [`Arc`], are fine.
pub struct ExtrinsicOrchestrator<C: ?Sized, K = AutoConfirm, S = NoopSink> {
    client: Arc<C>,
    gate: RegistrationGate<C>,
    confirm: K,
    sink: S,
}

impl<C: ?Sized, K: fmt::Debug, S: fmt::Debug> fmt::Debug for ExtrinsicOrchestrator<C, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtrinsicOrchestrator")
            .field("confirm", &self.confirm)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl<C: ExtrinsicClient + ?Sized + 'static> ExtrinsicOrchestrator<C> {
    /// Orchestrator over `client`, confirming everything and reporting
    /// progress nowhere.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            gate: RegistrationGate::new(Arc::clone(&client)),
            client,
            confirm: AutoConfirm,
            sink: NoopSink,
        }
    }
}

impl<C, K, S> ExtrinsicOrchestrator<C, K, S>
where
    C: ExtrinsicClient + ?Sized + 'static,
    K: Confirm,
    S: ProgressSink,
{
    /// Replace the confirmation policy.
    pub fn with_confirm<K2: Confirm>(self, confirm: K2) -> ExtrinsicOrchestrator<C, K2, S> {
        ExtrinsicOrchestrator {
            client: self.client,
            gate: self.gate,
            confirm,
            sink: self.sink,
        }
    }

    /// Replace the progress sink.
    pub fn with_sink<S2: ProgressSink>(self, sink: S2) -> ExtrinsicOrchestrator<C, K, S2> {
        ExtrinsicOrchestrator {
            client: self.client,
            gate: self.gate,
            confirm: self.confirm,
            sink,
        }
    }

    /// Register `participant` on the root network.
    ///
    /// An already registered participant is [`SubmissionOutcome::Confirmed`]
    /// without submitting anything. `params.netuid` is ignored.
    ///
    /// # Errors
    /// If chain state cannot be queried, or the extrinsic cannot be delivered.
    #[log(skip_all, fields(%participant))]
    pub async fn register(
        &self,
        participant: &ParticipantKey,
        params: &SubmissionParameters,
    ) -> Result<CallOutcome, Error> {
        let kind = ExtrinsicKind::Register;

        if self.gate.is_registered(participant).await? {
            self.sink.report(&Progress::AlreadyRegistered { participant });
            return Ok(self.finish(kind, SubmissionOutcome::Confirmed.into()));
        }

        if params.prompt && !self.confirm.confirm(&ConfirmationRequest::Register { participant }) {
            return Ok(self.finish(kind, CallOutcome::Aborted));
        }

        self.sink.report(&Progress::Submitting {
            kind,
            netuid: NetUid::ROOT,
        });
        let outcome = self
            .gate
            .submit_and_verify(participant, params.wait(), params.deadline)
            .await?;
        Ok(self.finish(kind, outcome.into()))
    }

    /// Set `weights` on `params.netuid`.
    ///
    /// Non-positive weights are dropped, the rest is normalized to the
    /// network's max weight limit and encoded to fixed point.
    ///
    /// # Errors
    /// - Fewer than the network's minimum number of weights remain
    /// - Chain parameters cannot be queried or are out of range
    /// - The extrinsic cannot be delivered
    #[log(skip_all, fields(netuid = %params.netuid))]
    pub async fn set_weights(
        &self,
        weights: &WeightVector,
        params: &SubmissionParameters,
    ) -> Result<CallOutcome, Error> {
        let kind = ExtrinsicKind::SetWeights;
        let netuid = params.netuid;

        let min_allowed_weights = self.min_allowed_weights(netuid).await?;
        let max_weight_limit = self.max_weight_limit(netuid).await?;
        let prepared = prepare_weights(weights, min_allowed_weights, max_weight_limit)?;
        debug!(
            min_allowed_weights,
            max_weight_limit,
            emitted = prepared.emitted.len(),
            "Weights prepared"
        );
        self.sink.report(&Progress::WeightsPrepared {
            netuid,
            prepared: &prepared,
        });

        if params.prompt
            && !self.confirm.confirm(&ConfirmationRequest::SetWeights {
                netuid,
                weights: &prepared.emitted,
            })
        {
            return Ok(self.finish(kind, CallOutcome::Aborted));
        }

        let call = Extrinsic::SetWeights {
            netuid,
            weights: prepared.emitted,
            version_key: params.version_key,
        };
        let wait = params.wait();
        self.sink.report(&Progress::Submitting { kind, netuid });
        let submission = chain::submit(&self.client, call, wait, params.deadline).await?;

        Ok(self.finish(kind, classify(submission, wait).into()))
    }

    /// [`Self::set_weights`] on the root network.
    ///
    /// # Errors
    /// See [`Self::set_weights`].
    pub async fn set_root_weights(
        &self,
        weights: &WeightVector,
        params: &SubmissionParameters,
    ) -> Result<CallOutcome, Error> {
        self.set_weights(weights, &params.on(NetUid::ROOT)).await
    }

    /// [`Self::set_weights`] under a deadline of `ttl`, or of
    /// [`DEFAULT_TTL`] if `None`.
    ///
    /// # Errors
    /// See [`Self::set_weights`].
    pub async fn set_weights_with_ttl(
        &self,
        weights: &WeightVector,
        params: &SubmissionParameters,
        ttl: Option<Duration>,
    ) -> Result<CallOutcome, Error> {
        let params = params.with_deadline(ttl.unwrap_or(DEFAULT_TTL));
        self.set_weights(weights, &params).await
    }

    /// Blocking form of [`Self::register`].
    ///
    /// # Errors
    /// See [`Self::register`]; also fails if the runtime cannot be started.
    ///
    /// # Panics
    /// If called from within an async runtime.
    pub fn register_blocking(
        &self,
        participant: &ParticipantKey,
        params: &SubmissionParameters,
    ) -> Result<CallOutcome, Error> {
        block_on(self.register(participant, params))?
    }

    /// Blocking form of [`Self::set_weights`].
    ///
    /// # Errors
    /// See [`Self::set_weights`]; also fails if the runtime cannot be started.
    ///
    /// # Panics
    /// If called from within an async runtime.
    pub fn set_weights_blocking(
        &self,
        weights: &WeightVector,
        params: &SubmissionParameters,
    ) -> Result<CallOutcome, Error> {
        block_on(self.set_weights(weights, params))?
    }

    /// Blocking form of [`Self::set_root_weights`].
    ///
    /// # Errors
    /// See [`Self::set_weights`]; also fails if the runtime cannot be started.
    ///
    /// # Panics
    /// If called from within an async runtime.
    pub fn set_root_weights_blocking(
        &self,
        weights: &WeightVector,
        params: &SubmissionParameters,
    ) -> Result<CallOutcome, Error> {
        block_on(self.set_root_weights(weights, params))?
    }

    /// Blocking form of [`Self::set_weights_with_ttl`].
    ///
    /// # Errors
    /// See [`Self::set_weights`]; also fails if the runtime cannot be started.
    ///
    /// # Panics
    /// If called from within an async runtime.
    pub fn set_weights_with_ttl_blocking(
        &self,
        weights: &WeightVector,
        params: &SubmissionParameters,
        ttl: Option<Duration>,
    ) -> Result<CallOutcome, Error> {
        block_on(self.set_weights_with_ttl(weights, params, ttl))?
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    async fn min_allowed_weights(&self, netuid: NetUid) -> Result<u64, ChainQueryError> {
        let param = ChainParam::MinAllowedWeights;
        let value = self.client.query_param(param, netuid).await?;
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
            return Err(ChainQueryError::ParamOutOfRange {
                param,
                netuid,
                value,
            });
        }
        Ok(value as u64)
    }

    async fn max_weight_limit(&self, netuid: NetUid) -> Result<f64, ChainQueryError> {
        let param = ChainParam::MaxWeightLimit;
        let value = self.client.query_param(param, netuid).await?;
        if !(value > 0.0 && value <= 1.0) {
            return Err(ChainQueryError::ParamOutOfRange {
                param,
                netuid,
                value,
            });
        }
        Ok(value)
    }

    fn finish(&self, kind: ExtrinsicKind, outcome: CallOutcome) -> CallOutcome {
        match &outcome {
            CallOutcome::Aborted => info!(%kind, "Declined at confirmation"),
            CallOutcome::Submitted(SubmissionOutcome::Confirmed) => info!(%kind, "Confirmed"),
            CallOutcome::Submitted(other) => warn!(%kind, outcome = %other, "Not confirmed"),
        }
        self.sink.report(&Progress::Finished {
            kind,
            outcome: &outcome,
        });
        outcome
    }
}

/// Classify a weight submission by the acknowledgement alone.
fn classify(submission: Guarded<Receipt>, wait: WaitFor) -> SubmissionOutcome {
    match submission {
        Guarded::TimedOut => SubmissionOutcome::TimedOut,
        Guarded::Completed(receipt) if !wait.is_waiting() => {
            if !receipt.success {
                warn!(message = %receipt.message, "Chain declined an extrinsic nobody waited for");
            }
            SubmissionOutcome::Unconfirmed
        }
        Guarded::Completed(receipt) if receipt.success => SubmissionOutcome::Confirmed,
        Guarded::Completed(receipt) => SubmissionOutcome::rejected(receipt.message),
    }
}

fn block_on<F: Future>(future: F) -> Result<F::Output, Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;
    Ok(runtime.block_on(future))
}
