//! Configuration of the synapse extrinsic workflow.
//!
//! Every section comes in two forms: a user layer, where each field is
//! optional and which is read from TOML and the environment, and the actual
//! configuration produced from it by [`Complete::complete`], where defaults
//! are filled in and values are checked for sanity.

pub mod client;
pub mod defaults;
pub mod env;
pub mod logger;

/// Conversion of a user layer into the actual configuration.
pub trait Complete {
    /// Actual configuration
    type Output;

    /// Fill in defaults and validate.
    ///
    /// # Errors
    /// If some value does not make sense.
    fn complete(self) -> CompleteResult<Self::Output>;
}

/// Result of [`Complete::complete`]
pub type CompleteResult<T> = Result<T, CompleteError>;

/// Errors raised while completing a user layer
#[derive(Debug, displaydoc::Display, thiserror::Error)]
pub enum CompleteError {
    /// `{field}` has insane value `{value}`: {message}
    InsaneValue {
        /// Offending field
        field: &'static str,
        /// Rendered value
        value: String,
        /// Why it is rejected
        message: String,
    },
    /// failed to parse env variable `{key}` with value `{value}`: {message}
    Env {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        message: String,
    },
}

impl CompleteError {
    pub(crate) fn insane(
        field: &'static str,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::InsaneValue {
            field,
            value: value.to_string(),
            message: message.into(),
        }
    }
}
