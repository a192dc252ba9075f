//! Per-call submission parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::extrinsic::{NetUid, WaitFor};

/// Parameters of a single submission. Built per call and never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmissionParameters {
    /// Target network
    pub netuid: NetUid,
    /// Version key of the validator software
    pub version_key: u64,
    /// Wait until the extrinsic is in a block
    pub wait_for_inclusion: bool,
    /// Wait until the block is final
    pub wait_for_finalization: bool,
    /// Hard deadline on the submission round trip
    pub deadline: Option<Duration>,
    /// Ask for confirmation before submitting
    pub prompt: bool,
}

impl SubmissionParameters {
    /// Fire-and-forget parameters for `netuid`.
    pub const fn new(netuid: NetUid) -> Self {
        Self {
            netuid,
            version_key: 0,
            wait_for_inclusion: false,
            wait_for_finalization: false,
            deadline: None,
            prompt: false,
        }
    }

    /// Set the version key.
    #[must_use]
    pub const fn with_version_key(mut self, version_key: u64) -> Self {
        self.version_key = version_key;
        self
    }

    /// Wait for block inclusion.
    #[must_use]
    pub const fn with_inclusion(mut self, wait: bool) -> Self {
        self.wait_for_inclusion = wait;
        self
    }

    /// Wait for finalization.
    #[must_use]
    pub const fn with_finalization(mut self, wait: bool) -> Self {
        self.wait_for_finalization = wait;
        self
    }

    /// Bound the submission by `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Require interactive confirmation.
    #[must_use]
    pub const fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// Same parameters aimed at another network.
    #[must_use]
    pub const fn on(mut self, netuid: NetUid) -> Self {
        self.netuid = netuid;
        self
    }

    /// What the chain client should wait for.
    pub const fn wait(&self) -> WaitFor {
        WaitFor {
            inclusion: self.wait_for_inclusion,
            finalization: self.wait_for_finalization,
        }
    }
}
