use toml::Value;

use super::env::EnvSource;
use super::field::FieldDecl;
use super::ConfigError;

/// Field values frozen at construction.
///
/// Later changes to the environment are never observed; only explicit
/// writes change a stored value.
#[derive(Debug, Clone)]
pub(crate) struct EagerFields {
    values: Vec<Option<Value>>,
}

impl EagerFields {
    /// Resolves every field once. An explicit override (already cast) takes
    /// the place of the environment for its field.
    pub(crate) fn bind(
        fields: &[FieldDecl],
        env: &dyn EnvSource,
        overrides: Vec<Option<Value>>,
    ) -> Result<Self, ConfigError> {
        let values = fields
            .iter()
            .zip(overrides)
            .map(|(decl, explicit)| match explicit {
                Some(value) => Ok(Some(value)),
                None => decl.resolve(env),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { values })
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Value> {
        self.values[index].as_ref()
    }

    pub(crate) fn set(&mut self, index: usize, value: Option<Value>) {
        self.values[index] = value;
    }
}
