//! Logger section of the configuration.

use serde::{Deserialize, Serialize};

use crate::{
    env::{parse_env, ReadEnv},
    Complete, CompleteResult,
};

/// Log level for reading from environment and (de)serializing
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    strum::EnumString,
    strum::Display,
)]
#[strum(ascii_case_insensitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum Level {
    /// Trace
    TRACE,
    /// Debug
    DEBUG,
    /// Info (Default)
    #[default]
    INFO,
    /// Warn
    WARN,
    /// Error
    ERROR,
}

/// Convert [`Level`] into [`tracing::Level`]
pub fn into_tracing_level(level: Level) -> tracing::Level {
    match level {
        Level::TRACE => tracing::Level::TRACE,
        Level::DEBUG => tracing::Level::DEBUG,
        Level::INFO => tracing::Level::INFO,
        Level::WARN => tracing::Level::WARN,
        Level::ERROR => tracing::Level::ERROR,
    }
}

/// Reflects formatters in `tracing_subscriber::fmt::format`
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    Default,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Format {
    /// Full, multi-field lines
    #[default]
    Full,
    /// Compact lines
    Compact,
    /// Multi-line, human oriented
    Pretty,
    /// Newline-delimited JSON
    Json,
}

/// 'Logger' configuration as written by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UserLayer {
    /// Level of logging verbosity
    pub level: Option<Level>,
    /// Output format
    pub format: Option<Format>,
}

impl UserLayer {
    /// Override fields with `SYNAPSE_LOG_LEVEL` and `SYNAPSE_LOG_FORMAT`.
    ///
    /// # Errors
    /// If a variable is set to something unparsable.
    pub fn merge_env(&mut self, env: &impl ReadEnv) -> CompleteResult<()> {
        if let Some(level) = parse_env(env, "SYNAPSE_LOG_LEVEL")? {
            self.level = Some(level);
        }
        if let Some(format) = parse_env(env, "SYNAPSE_LOG_FORMAT")? {
            self.format = Some(format);
        }
        Ok(())
    }
}

/// 'Logger' configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Level of logging verbosity
    pub level: Level,
    /// Output format
    pub format: Format,
}

impl Complete for UserLayer {
    type Output = Config;

    fn complete(self) -> CompleteResult<Self::Output> {
        Ok(Config {
            level: self.level.unwrap_or_default(),
            format: self.format.unwrap_or_default(),
        })
    }
}
