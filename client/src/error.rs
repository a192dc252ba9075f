use synapse_data_model::InvalidInputError;

use crate::chain::{ChainQueryError, TransportError};

/// Errors which abort an orchestrated call.
///
/// Chain rejections, timeouts and unconfirmed submissions are not errors:
/// they are reported as a [`SubmissionOutcome`](synapse_data_model::outcome::SubmissionOutcome).
#[derive(Debug, displaydoc::Display, thiserror::Error)]
pub enum Error {
    /// invalid input: {0}
    InvalidInput(#[from] InvalidInputError),
    /// the minimum number of weights required to set weights is {required}, got {actual}
    InsufficientWeights {
        /// Required by the chain
        required: u64,
        /// Non-zero weights supplied
        actual: usize,
    },
    /// failed to query chain state
    ChainQuery(#[from] ChainQueryError),
    /// failed to hand the extrinsic to the chain
    Transport(#[from] TransportError),
    /// submission worker panicked
    WorkerPanicked(#[source] tokio::task::JoinError),
    /// submission worker exited without reporting a result
    WorkerLost,
    /// failed to start an async runtime or its worker thread
    Runtime(#[source] std::io::Error),
}
