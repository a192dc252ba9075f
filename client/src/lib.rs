//! Crate contains the client-side extrinsic workflow: it prepares weight
//! vectors for emission, submits registration and weight-setting extrinsics
//! through an [`ExtrinsicClient`](chain::ExtrinsicClient), and classifies
//! what is known about them afterwards.

/// Contract of the external chain client
pub mod chain;
/// Hard wall-clock deadline around a submission
pub mod deadline;
mod error;
/// Composition of the register and set-weights flows
pub mod orchestrator;
/// Idempotent participant registration
pub mod registration;
/// Weight filtering, normalization and fixed-point encoding
pub mod weights;

pub use error::Error;
pub use synapse_data_model as data_model;

pub mod prelude {
    //! Re-exports of the most commonly used items.

    pub use synapse_data_model::prelude::*;

    pub use crate::{
        chain::{ChainQueryError, ExtrinsicClient, TransportError},
        deadline::{DeadlineGuard, Guarded},
        orchestrator::{
            AutoConfirm, Confirm, ConfirmationRequest, ExtrinsicOrchestrator, NoopSink, Progress,
            ProgressSink, TracingSink,
        },
        registration::RegistrationGate,
        weights::{encode_for_emit, filter_weights, normalize_max_weight, prepare_weights},
        Error,
    };
}
