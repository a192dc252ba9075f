//! The chain client is external: it owns connections, signing keys and
//! encoding. This module only fixes what the workflow needs from it.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use synapse_data_model::prelude::*;
use synapse_logger::prelude::*;

use crate::{
    deadline::{DeadlineGuard, Guarded},
    Error,
};

/// Boxed error of a concrete chain client
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to read chain state.
#[derive(Debug, displaydoc::Display, thiserror::Error)]
pub enum ChainQueryError {
    /// chain endpoint is unreachable: {0}
    Unreachable(String),
    /// chain reported `{value}` for `{param}` on network {netuid}, which is out of range
    ParamOutOfRange {
        /// Queried parameter
        param: ChainParam,
        /// Queried network
        netuid: NetUid,
        /// Reported value
        value: f64,
    },
    /// chain query failed
    Other(#[source] BoxError),
}

/// Failure to hand an extrinsic over to the chain.
///
/// This is distinct from the chain declining the extrinsic, which is
/// reported through [`Receipt`].
#[derive(Debug, displaydoc::Display, thiserror::Error)]
pub enum TransportError {
    /// connection to the chain endpoint dropped: {0}
    ConnectionDropped(String),
    /// extrinsic could not be delivered
    Other(#[source] BoxError),
}

/// Operations the workflow needs from a chain client.
///
/// Implementations must be cancel-safe with respect to their own state:
/// a submission future may be dropped at any await point once its deadline
/// elapses. A submission that blocks its thread is not cancelled but left
/// to finish on its own.
#[async_trait]
pub trait ExtrinsicClient: Send + Sync {
    /// Whether `participant` is registered on `netuid`.
    ///
    /// # Errors
    /// If the chain cannot be queried.
    async fn is_registered(
        &self,
        netuid: NetUid,
        participant: &ParticipantKey,
    ) -> Result<bool, ChainQueryError>;

    /// Sign and broadcast `call`, following it as far as `wait` requests.
    ///
    /// # Errors
    /// If the extrinsic could not be delivered at all.
    async fn submit_extrinsic(
        &self,
        call: Extrinsic,
        wait: WaitFor,
    ) -> Result<Receipt, TransportError>;

    /// Current value of `param` on `netuid`.
    ///
    /// # Errors
    /// If the chain cannot be queried.
    async fn query_param(&self, param: ChainParam, netuid: NetUid)
        -> Result<f64, ChainQueryError>;
}

/// Submit `call`, under a [`DeadlineGuard`] if `deadline` is set.
///
/// Without a deadline the submission runs inline and may block for as long
/// as the chain client does.
pub(crate) async fn submit<C>(
    client: &Arc<C>,
    call: Extrinsic,
    wait: WaitFor,
    deadline: Option<Duration>,
) -> Result<Guarded<Receipt>, Error>
where
    C: ExtrinsicClient + ?Sized + 'static,
{
    let kind = call.kind();
    let Some(ttl) = deadline else {
        let receipt = client.submit_extrinsic(call, wait).await?;
        return Ok(Guarded::Completed(receipt));
    };

    let client = Arc::clone(client);
    let guarded = DeadlineGuard::new(ttl)
        .run(async move { client.submit_extrinsic(call, wait).await })
        .await?;

    match guarded {
        Guarded::Completed(result) => Ok(Guarded::Completed(result?)),
        Guarded::TimedOut => {
            warn!(%kind, ?ttl, "Submission exceeded its deadline, its result will be discarded");
            Ok(Guarded::TimedOut)
        }
    }
}
