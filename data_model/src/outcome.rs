//! Outcome classification of a submitted extrinsic.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// What is known about a submitted extrinsic once the call returns.
///
/// [`Self::TimedOut`] and [`Self::Unconfirmed`] both mean "unknown": the
/// extrinsic may or may not be on chain, and callers should re-query chain
/// state before retrying.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Chain accepted the extrinsic, finalized if that was requested
    #[display(fmt = "confirmed")]
    Confirmed,
    /// Chain explicitly declined the extrinsic
    #[display(fmt = "rejected: {}", message)]
    Rejected {
        /// Message reported by the chain
        message: String,
    },
    /// Deadline elapsed without a definitive answer
    #[display(fmt = "timed out")]
    TimedOut,
    /// Caller did not wait for inclusion or finalization
    #[display(fmt = "unconfirmed")]
    Unconfirmed,
}

impl SubmissionOutcome {
    /// Construct [`Self::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// `true` only for [`Self::Confirmed`]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// `true` if the chain state is known: confirmed or rejected
    pub const fn is_definitive(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected { .. })
    }
}

/// Result of one orchestrated call.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CallOutcome {
    /// Confirmation was declined; nothing was sent
    #[display(fmt = "aborted")]
    Aborted,
    /// The extrinsic was handed to the chain client
    #[display(fmt = "{}", _0)]
    Submitted(SubmissionOutcome),
}

impl From<SubmissionOutcome> for CallOutcome {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self::Submitted(outcome)
    }
}

impl CallOutcome {
    /// The submission outcome, unless the call was aborted.
    pub const fn submitted(&self) -> Option<&SubmissionOutcome> {
        match self {
            Self::Aborted => None,
            Self::Submitted(outcome) => Some(outcome),
        }
    }

    /// `true` if the extrinsic is known to be on chain
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Submitted(SubmissionOutcome::Confirmed))
    }
}
