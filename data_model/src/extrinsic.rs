//! Payloads handed to the chain client and what comes back.

use std::str::FromStr;

use derive_more::{Display, From};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{weight::FixedPointWeight, InvalidInputError};

/// Network (subnet) identifier.
#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    From,
    Decode,
    Encode,
    Deserialize,
    Serialize,
)]
#[serde(transparent)]
pub struct NetUid(pub u16);

impl NetUid {
    /// The root network. Registration always targets it.
    pub const ROOT: Self = Self(0);

    /// `true` for [`Self::ROOT`]
    pub const fn is_root(self) -> bool {
        self.0 == Self::ROOT.0
    }
}

/// Public address of a participant, e.g. an ss58-encoded hot key.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Decode, Encode, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantKey(String);

impl ParticipantKey {
    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ParticipantKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ParticipantKey {
    type Err = InvalidInputError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let key = key.trim();
        if key.is_empty() {
            return Err(InvalidInputError::EmptyParticipantKey);
        }
        Ok(Self(key.to_owned()))
    }
}

impl TryFrom<String> for ParticipantKey {
    type Error = InvalidInputError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        key.parse()
    }
}

impl From<ParticipantKey> for String {
    fn from(ParticipantKey(key): ParticipantKey) -> Self {
        key
    }
}

/// Chain parameters consulted before setting weights.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainParam {
    /// Minimum number of non-zero weights a vector must carry
    #[display(fmt = "min_allowed_weights")]
    MinAllowedWeights,
    /// Largest share of influence a single target may receive, in `(0, 1]`
    #[display(fmt = "max_weight_limit")]
    MaxWeightLimit,
}

/// Kind of an [`Extrinsic`], for logging and accounting.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ExtrinsicKind {
    /// Participant registration
    #[display(fmt = "register")]
    Register,
    /// Weight setting
    #[display(fmt = "set_weights")]
    SetWeights,
}

/// A state-mutating call to be signed and broadcast by the chain client.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize)]
#[allow(trivial_numeric_casts)] // emitted by the `Encode`/`Decode` derives
pub enum Extrinsic {
    /// Register `participant` on `netuid`.
    Register {
        /// Network to register on
        netuid: NetUid,
        /// Participant being registered
        participant: ParticipantKey,
    },
    /// Replace the outgoing weights of the signer on `netuid`.
    SetWeights {
        /// Network the weights apply to
        netuid: NetUid,
        /// Weights sorted by uid ascending
        weights: Vec<FixedPointWeight>,
        /// Version key of the validator software
        version_key: u64,
    },
}

impl Extrinsic {
    /// Kind of this call
    pub const fn kind(&self) -> ExtrinsicKind {
        match self {
            Self::Register { .. } => ExtrinsicKind::Register,
            Self::SetWeights { .. } => ExtrinsicKind::SetWeights,
        }
    }

    /// Network this call targets
    pub const fn netuid(&self) -> NetUid {
        match self {
            Self::Register { netuid, .. } | Self::SetWeights { netuid, .. } => *netuid,
        }
    }
}

/// How far the chain client should follow the extrinsic before returning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct WaitFor {
    /// Wait until the extrinsic is in a block
    pub inclusion: bool,
    /// Wait until that block is final
    pub finalization: bool,
}

impl WaitFor {
    /// Return immediately after the acknowledgement.
    pub const NOTHING: Self = Self {
        inclusion: false,
        finalization: false,
    };

    /// `true` if either inclusion or finalization is awaited.
    pub const fn is_waiting(self) -> bool {
        self.inclusion || self.finalization
    }
}

/// Explicit answer of the chain client to a submission.
#[derive(Debug, Display, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[display(fmt = "success: {}, message: {:?}", success, message)]
pub struct Receipt {
    /// `true` if the chain accepted the extrinsic
    pub success: bool,
    /// Error message reported by the chain, empty on success
    pub message: String,
}

impl Receipt {
    /// Accepted, no message.
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    /// Declined with `message`.
    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
