//! Reading configuration overrides from the environment.

use std::{
    borrow::Cow,
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt::Display,
    str::FromStr,
};

use crate::CompleteError;

/// Prefix shared by all recognised variables
pub const ENV_PREFIX: &str = "SYNAPSE_";

/// Source of environment variables
pub trait ReadEnv {
    /// Value of `key`, if set
    fn read_env(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl<F> ReadEnv for F
where
    F: Fn(&str) -> Option<Cow<'static, str>>,
{
    fn read_env(&self, key: &str) -> Option<Cow<'_, str>> {
        self(key)
    }
}

/// Process environment
pub fn std_env(key: &str) -> Option<Cow<'static, str>> {
    match std::env::var(key) {
        Ok(value) => Some(Cow::from(value)),
        Err(std::env::VarError::NotPresent) => None,
        Err(_) => {
            tracing::error!(key, "Found non-unicode characters in env var, ignoring");
            None
        }
    }
}

/// An implementation of [`ReadEnv`] for testing convenience.
#[derive(Debug, Default)]
pub struct TestEnv {
    map: HashMap<String, String>,
    visited: RefCell<HashSet<String>>,
}

impl TestEnv {
    /// Create new empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key-value pair
    #[must_use]
    pub fn set(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.map
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Keys set but never read
    pub fn unvisited(&self) -> HashSet<String> {
        let visited = self.visited.borrow();
        self.map
            .keys()
            .filter(|key| !visited.contains(*key))
            .cloned()
            .collect()
    }
}

impl ReadEnv for TestEnv {
    fn read_env(&self, key: &str) -> Option<Cow<'_, str>> {
        self.visited.borrow_mut().insert(key.to_string());
        self.map.get(key).map(|value| Cow::from(value.as_str()))
    }
}

/// Read and parse `key`. Unset variables yield `Ok(None)`.
///
/// # Errors
/// If the variable is set but does not parse.
pub fn parse_env<T>(env: &impl ReadEnv, key: &'static str) -> Result<Option<T>, CompleteError>
where
    T: FromStr,
    T::Err: Display,
{
    env.read_env(key)
        .map(|raw| {
            raw.trim().parse().map_err(|err: T::Err| CompleteError::Env {
                key,
                value: raw.clone().into_owned(),
                message: err.to_string(),
            })
        })
        .transpose()
}
