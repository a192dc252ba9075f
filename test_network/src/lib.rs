//! In-memory chain for exercising the extrinsic workflow. Used only for tests
use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use synapse_client::chain::{ChainQueryError, ExtrinsicClient, TransportError};
use synapse_data_model::prelude::*;
use synapse_logger::debug;

/// Value of [`ChainParam::MinAllowedWeights`] unless configured
pub const DEFAULT_MIN_ALLOWED_WEIGHTS: f64 = 1.0;
/// Value of [`ChainParam::MaxWeightLimit`] unless configured
pub const DEFAULT_MAX_WEIGHT_LIMIT: f64 = 1.0;

/// What a delivered `Register` extrinsic does to chain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegisterPolicy {
    FollowReceipt,
    Always,
    Never,
}

/// How a submission is held before it is answered.
#[derive(Debug, Clone, Copy)]
enum Delay {
    /// Sleep on the timer, yielding to the runtime
    Yielding(Duration),
    /// Sleep on the thread, as a synchronous network client would
    Blocking(Duration),
}

#[derive(Debug, Clone)]
enum Response {
    Receipt(Receipt),
    TransportFailure(String),
}

#[derive(Debug)]
struct State {
    registered: HashSet<(NetUid, ParticipantKey)>,
    params: HashMap<(ChainParam, NetUid), f64>,
    response: Response,
    register_policy: RegisterPolicy,
    submit_delay: Option<Delay>,
    unreachable: Option<String>,
    submitted: Vec<(Extrinsic, WaitFor)>,
}

#[derive(Debug, Default)]
struct Counters {
    submissions: AtomicUsize,
    completed_submissions: AtomicUsize,
    status_queries: AtomicUsize,
    param_queries: AtomicUsize,
}

/// Scriptable chain implementing [`ExtrinsicClient`].
///
/// By default every submission is accepted at once, an accepted
/// registration is visible immediately, and chain parameters are
/// [`DEFAULT_MIN_ALLOWED_WEIGHTS`] and [`DEFAULT_MAX_WEIGHT_LIMIT`].
#[derive(Debug)]
pub struct MockChain {
    state: Mutex<State>,
    counters: Counters,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    /// Chain with default behaviour.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                registered: HashSet::new(),
                params: HashMap::new(),
                response: Response::Receipt(Receipt::accepted()),
                register_policy: RegisterPolicy::FollowReceipt,
                submit_delay: None,
                unreachable: None,
                submitted: Vec::new(),
            }),
            counters: Counters::default(),
        }
    }

    /// Set `participant` as registered on `netuid`.
    #[must_use]
    pub fn with_registered(self, netuid: NetUid, participant: ParticipantKey) -> Self {
        self.set_registered(netuid, participant, true);
        self
    }

    /// Set `param` on `netuid` to `value`.
    #[must_use]
    pub fn with_param(self, param: ChainParam, netuid: NetUid, value: f64) -> Self {
        self.state.lock().params.insert((param, netuid), value);
        self
    }

    /// Answer every submission with `receipt`.
    #[must_use]
    pub fn respond_with(self, receipt: Receipt) -> Self {
        self.state.lock().response = Response::Receipt(receipt);
        self
    }

    /// Fail every submission with [`TransportError::ConnectionDropped`].
    #[must_use]
    pub fn fail_transport_with(self, message: impl Into<String>) -> Self {
        self.state.lock().response = Response::TransportFailure(message.into());
        self
    }

    /// Make a delivered registration visible (`true`) or invisible (`false`)
    /// whatever the receipt says.
    #[must_use]
    pub fn registering_on_submit(self, registers: bool) -> Self {
        self.state.lock().register_policy = if registers {
            RegisterPolicy::Always
        } else {
            RegisterPolicy::Never
        };
        self
    }

    /// Hold every submission for `delay` before answering.
    #[must_use]
    pub fn with_submit_delay(self, delay: Duration) -> Self {
        self.state.lock().submit_delay = Some(Delay::Yielding(delay));
        self
    }

    /// Block the submitting thread for `delay` before answering, never
    /// yielding to the runtime.
    #[must_use]
    pub fn with_blocking_submit(self, delay: Duration) -> Self {
        self.state.lock().submit_delay = Some(Delay::Blocking(delay));
        self
    }

    /// Fail every query with [`ChainQueryError::Unreachable`].
    #[must_use]
    pub fn unreachable(self, message: impl Into<String>) -> Self {
        self.state.lock().unreachable = Some(message.into());
        self
    }

    /// Change registration status of `participant` on `netuid`.
    pub fn set_registered(&self, netuid: NetUid, participant: ParticipantKey, registered: bool) {
        let mut state = self.state.lock();
        if registered {
            state.registered.insert((netuid, participant));
        } else {
            state.registered.remove(&(netuid, participant));
        }
    }

    /// Current registration status, without counting a query.
    pub fn registered_now(&self, netuid: NetUid, participant: &ParticipantKey) -> bool {
        self.state
            .lock()
            .registered
            .contains(&(netuid, participant.clone()))
    }

    /// Every extrinsic handed over so far, in order.
    pub fn submissions(&self) -> Vec<(Extrinsic, WaitFor)> {
        self.state.lock().submitted.clone()
    }

    /// Number of submissions started
    pub fn submission_count(&self) -> usize {
        self.counters.submissions.load(Ordering::SeqCst)
    }

    /// Number of submissions which ran to completion, i.e. were not cancelled
    pub fn completed_submission_count(&self) -> usize {
        self.counters.completed_submissions.load(Ordering::SeqCst)
    }

    /// Number of registration status queries
    pub fn status_query_count(&self) -> usize {
        self.counters.status_queries.load(Ordering::SeqCst)
    }

    /// Number of chain parameter queries
    pub fn param_query_count(&self) -> usize {
        self.counters.param_queries.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), ChainQueryError> {
        match &self.state.lock().unreachable {
            Some(message) => Err(ChainQueryError::Unreachable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExtrinsicClient for MockChain {
    async fn is_registered(
        &self,
        netuid: NetUid,
        participant: &ParticipantKey,
    ) -> Result<bool, ChainQueryError> {
        self.counters.status_queries.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self.registered_now(netuid, participant))
    }

    async fn submit_extrinsic(
        &self,
        call: Extrinsic,
        wait: WaitFor,
    ) -> Result<Receipt, TransportError> {
        self.counters.submissions.fetch_add(1, Ordering::SeqCst);
        let (delay, response) = {
            let mut state = self.state.lock();
            state.submitted.push((call.clone(), wait));
            (state.submit_delay, state.response.clone())
        };
        debug!(kind = %call.kind(), ?delay, "Mock chain received extrinsic");

        match delay {
            Some(Delay::Yielding(delay)) => tokio::time::sleep(delay).await,
            Some(Delay::Blocking(delay)) => std::thread::sleep(delay),
            None => {}
        }
        self.counters
            .completed_submissions
            .fetch_add(1, Ordering::SeqCst);

        let receipt = match response {
            Response::TransportFailure(message) => {
                return Err(TransportError::ConnectionDropped(message))
            }
            Response::Receipt(receipt) => receipt,
        };

        if let Extrinsic::Register {
            netuid,
            participant,
        } = call
        {
            let registers = match self.state.lock().register_policy {
                RegisterPolicy::FollowReceipt => receipt.success,
                RegisterPolicy::Always => true,
                RegisterPolicy::Never => false,
            };
            if registers {
                self.set_registered(netuid, participant, true);
            }
        }

        Ok(receipt)
    }

    async fn query_param(
        &self,
        param: ChainParam,
        netuid: NetUid,
    ) -> Result<f64, ChainQueryError> {
        self.counters.param_queries.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        let configured = self.state.lock().params.get(&(param, netuid)).copied();
        Ok(configured.unwrap_or(match param {
            ChainParam::MinAllowedWeights => DEFAULT_MIN_ALLOWED_WEIGHTS,
            ChainParam::MaxWeightLimit => DEFAULT_MAX_WEIGHT_LIMIT,
        }))
    }
}
