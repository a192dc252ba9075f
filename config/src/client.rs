//! Client configuration: chain endpoint, submission defaults and logging.

use std::{fs, path::Path, time::Duration};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use synapse_data_model::{extrinsic::NetUid, submission::SubmissionParameters};
use url::Url;

use crate::{
    defaults,
    env::{parse_env, ReadEnv},
    logger, Complete, CompleteError, CompleteResult,
};

const SUPPORTED_ENDPOINT_SCHEMES: [&str; 4] = ["ws", "wss", "http", "https"];

/// Client configuration as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct UserLayer {
    /// `[chain]` section
    pub chain: ChainUserLayer,
    /// `[submission]` section
    pub submission: SubmissionUserLayer,
    /// `[logger]` section
    pub logger: logger::UserLayer,
}

/// `[chain]` section as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChainUserLayer {
    /// Network name, e.g. `prometheus`
    pub network: Option<String>,
    /// Chain endpoint overriding the one implied by `network`
    pub endpoint: Option<Url>,
    /// Default network uid for weight submissions
    pub netuid: Option<NetUid>,
}

/// `[submission]` section as written by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubmissionUserLayer {
    /// Version key of the validator software
    pub version_key: Option<u64>,
    /// Wait for block inclusion
    pub wait_for_inclusion: Option<bool>,
    /// Wait for finalization
    pub wait_for_finalization: Option<bool>,
    /// Deadline on every submission, in milliseconds
    pub ttl_ms: Option<u64>,
    /// Ask for confirmation before submitting
    pub prompt: Option<bool>,
}

impl UserLayer {
    /// Read the user layer from a TOML file.
    ///
    /// # Errors
    /// - If file is not found, or not a valid TOML
    /// - If the TOML holds unknown fields
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot open file at location `{}`", path.display()))?;
        toml::from_str(&contents).wrap_err("failed to parse toml")
    }

    /// Override fields with `SYNAPSE_*` environment variables.
    ///
    /// # Errors
    /// If a variable is set to something unparsable.
    pub fn merge_env(&mut self, env: &impl ReadEnv) -> CompleteResult<()> {
        let chain = &mut self.chain;
        if let Some(network) = env.read_env("SYNAPSE_NETWORK") {
            chain.network = Some(network.into_owned());
        }
        if let Some(endpoint) = parse_env(env, "SYNAPSE_CHAIN_ENDPOINT")? {
            chain.endpoint = Some(endpoint);
        }
        if let Some(netuid) = parse_env::<u16>(env, "SYNAPSE_NETUID")? {
            chain.netuid = Some(NetUid(netuid));
        }

        let submission = &mut self.submission;
        macro_rules! merge {
            ($($field:ident <- $key:literal),+ $(,)?) => {
                $(
                    if let Some(value) = parse_env(env, $key)? {
                        submission.$field = Some(value);
                    }
                )+
            };
        }
        merge! {
            version_key <- "SYNAPSE_VERSION_KEY",
            wait_for_inclusion <- "SYNAPSE_WAIT_FOR_INCLUSION",
            wait_for_finalization <- "SYNAPSE_WAIT_FOR_FINALIZATION",
            ttl_ms <- "SYNAPSE_TTL_MS",
            prompt <- "SYNAPSE_PROMPT",
        }

        self.logger.merge_env(env)
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chain section
    pub chain: Chain,
    /// Submission defaults
    pub submission: Submission,
    /// Logger section
    pub logger: logger::Config,
}

/// Where the chain is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Network name
    pub network: String,
    /// Explicit endpoint, if configured
    pub endpoint: Option<Url>,
    /// Default network uid
    pub netuid: NetUid,
}

/// Defaults applied to every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    /// Version key of the validator software
    pub version_key: u64,
    /// Wait for block inclusion
    pub wait_for_inclusion: bool,
    /// Wait for finalization
    pub wait_for_finalization: bool,
    /// Deadline on every submission
    pub ttl: Option<Duration>,
    /// Ask for confirmation before submitting
    pub prompt: bool,
}

impl Config {
    /// Load from an optional TOML file with environment overrides on top.
    ///
    /// # Errors
    /// If the file cannot be read, or the result is not a sane configuration.
    pub fn load(path: Option<&Path>, env: &impl ReadEnv) -> Result<Self> {
        let mut layer = match path {
            Some(path) => UserLayer::from_toml(path)?,
            None => UserLayer::default(),
        };
        layer
            .merge_env(env)
            .wrap_err("failed to read configuration from the environment")?;
        layer
            .complete()
            .wrap_err("invalid client configuration")
    }

    /// Submission parameters for the configured default network.
    pub fn submission_parameters(&self) -> SubmissionParameters {
        self.submission_parameters_for(self.chain.netuid)
    }

    /// Submission parameters for `netuid`.
    pub fn submission_parameters_for(&self, netuid: NetUid) -> SubmissionParameters {
        let submission = &self.submission;
        let params = SubmissionParameters::new(netuid)
            .with_version_key(submission.version_key)
            .with_inclusion(submission.wait_for_inclusion)
            .with_finalization(submission.wait_for_finalization)
            .with_prompt(submission.prompt);

        match submission.ttl {
            Some(ttl) => params.with_deadline(ttl),
            None => params,
        }
    }
}

impl Complete for ChainUserLayer {
    type Output = Chain;

    fn complete(self) -> CompleteResult<Self::Output> {
        let network = self
            .network
            .unwrap_or_else(|| defaults::chain::DEFAULT_NETWORK.to_owned());
        if network.trim().is_empty() {
            return Err(CompleteError::insane(
                "chain.network",
                &network,
                "network name must not be empty",
            ));
        }

        if let Some(endpoint) = &self.endpoint {
            if !SUPPORTED_ENDPOINT_SCHEMES.contains(&endpoint.scheme()) {
                return Err(CompleteError::insane(
                    "chain.endpoint",
                    endpoint,
                    format!("scheme must be one of {SUPPORTED_ENDPOINT_SCHEMES:?}"),
                ));
            }
        }

        Ok(Chain {
            network,
            endpoint: self.endpoint,
            netuid: self.netuid.unwrap_or(defaults::chain::DEFAULT_NETUID),
        })
    }
}

impl Complete for SubmissionUserLayer {
    type Output = Submission;

    fn complete(self) -> CompleteResult<Self::Output> {
        use defaults::submission::*;

        let ttl = match self.ttl_ms {
            Some(0) => {
                return Err(CompleteError::insane(
                    "submission.ttl_ms",
                    0,
                    "a zero deadline would time out every submission",
                ))
            }
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };

        Ok(Submission {
            version_key: self.version_key.unwrap_or(DEFAULT_VERSION_KEY),
            wait_for_inclusion: self.wait_for_inclusion.unwrap_or(DEFAULT_WAIT_FOR_INCLUSION),
            wait_for_finalization: self
                .wait_for_finalization
                .unwrap_or(DEFAULT_WAIT_FOR_FINALIZATION),
            ttl,
            prompt: self.prompt.unwrap_or(DEFAULT_PROMPT),
        })
    }
}

impl Complete for UserLayer {
    type Output = Config;

    fn complete(self) -> CompleteResult<Self::Output> {
        Ok(Config {
            chain: self.chain.complete()?,
            submission: self.submission.complete()?,
            logger: self.logger.complete()?,
        })
    }
}
