//! Synapse Data Model contains the types exchanged between the extrinsic
//! workflow and the chain client: weight vectors, their fixed-point
//! emission form, extrinsic payloads and submission outcomes.

pub mod extrinsic;
pub mod outcome;
pub mod submission;
pub mod weight;

/// Input rejected before anything is sent to the chain.
#[derive(Debug, Clone, PartialEq, displaydoc::Display, thiserror::Error)]
#[allow(missing_copy_implementations)]
pub enum InvalidInputError {
    /// uid `{0}` appears more than once in the weight vector
    DuplicateUid(weight::Uid),
    /// got {uids} uids but {weights} weights
    LengthMismatch {
        /// Number of uids supplied
        uids: usize,
        /// Number of weights supplied
        weights: usize,
    },
    /// weight for uid `{0}` is not a finite number
    NonFiniteWeight(weight::Uid),
    /// weight for uid `{0}` is negative
    NegativeWeight(weight::Uid),
    /// max weight limit `{0}` is outside of (0, 1]
    WeightLimitOutOfRange(f64),
    /// participant key must not be empty
    EmptyParticipantKey,
}

pub mod prelude {
    //! Re-exports of the most commonly used types.

    pub use super::{
        extrinsic::{ChainParam, Extrinsic, ExtrinsicKind, NetUid, ParticipantKey, Receipt, WaitFor},
        outcome::{CallOutcome, SubmissionOutcome},
        submission::SubmissionParameters,
        weight::{u16_normalized_float, FixedPointWeight, Uid, WeightVector, FIXED_POINT_MAX},
        InvalidInputError,
    };
}
