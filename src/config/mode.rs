use super::cast::cast_bool;
use super::env::{resolve, EnvSource};
use super::ConfigError;

/// Environment variable selecting lazy binding for classes built without an
/// explicit mode.
pub const LAZY_MODE_FLAG: &str = "env_class_lazy";

/// How the fields of a class are bound to the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BindingMode {
    /// Resolve every field once, when an instance is constructed.
    #[default]
    Eager,
    /// Resolve a field again on every read.
    Lazy,
}

impl BindingMode {
    /// Reads the mode selector from `env`: truthy selects [`BindingMode::Lazy`],
    /// falsy or unset selects [`BindingMode::Eager`].
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(if read_flag(env, LAZY_MODE_FLAG)? {
            Self::Lazy
        } else {
            Self::Eager
        })
    }
}

/// How long an explicit write to a lazily bound field survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverridePolicy {
    /// The written value is returned by every read until the field is refreshed.
    #[default]
    UntilRefresh,
    /// Every read re-derives from the environment and discards the write.
    UntilNextRead,
}

/// Resolves a boolean control variable, defaulting to `false`.
pub(crate) fn read_flag(env: &dyn EnvSource, name: &str) -> Result<bool, ConfigError> {
    match resolve(env, name, None)? {
        Some(value) => cast_bool(&value).map_err(|e| ConfigError::cast(name, e)),
        None => Ok(false),
    }
}
