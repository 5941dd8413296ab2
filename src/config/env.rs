use std::collections::HashMap;
use std::env::VarError;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use toml::Value;

use super::ConfigError;

/// Where bound values are read from.
pub trait EnvSource: Send + Sync + fmt::Debug {
    /// Returns `Ok(None)` when `key` is unset.
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// The process environment.
///
/// A value that is not valid unicode is an error, never a lossy string.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv;

impl EnvSource for StdEnv {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(key.to_string())),
        }
    }
}

/// An in-memory environment.
///
/// Clones share the same map, so a handle kept by the caller observes and
/// drives the values seen by every class built on it.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: Arc<RwLock<HashMap<String, String>>>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let env = Self::new();
        for (key, value) in iter {
            env.set(key, value);
        }
        env
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self
            .vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }
}

/// Which tier supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    Upper,
    Lower,
    Default,
    Absent,
}

/// Resolves `name` as the upper-cased variable, then the lower-cased one,
/// then `default`. The order is the same for every binder.
pub(crate) fn resolve(
    env: &dyn EnvSource,
    name: &str,
    default: Option<&Value>,
) -> Result<Option<Value>, ConfigError> {
    let (value, origin) = resolve_with_origin(env, name, default)?;
    tracing::trace!(field = name, ?origin, "resolved field");
    Ok(value)
}

pub(crate) fn resolve_with_origin(
    env: &dyn EnvSource,
    name: &str,
    default: Option<&Value>,
) -> Result<(Option<Value>, Origin), ConfigError> {
    if let Some(v) = env.var(&name.to_uppercase())? {
        return Ok((Some(Value::String(v)), Origin::Upper));
    }
    if let Some(v) = env.var(&name.to_lowercase())? {
        return Ok((Some(Value::String(v)), Origin::Lower));
    }
    Ok(match default {
        Some(v) => (Some(v.clone()), Origin::Default),
        None => (None, Origin::Absent),
    })
}
