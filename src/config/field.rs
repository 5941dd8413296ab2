//! Field declarations: the explicit, ordered replacement for annotated class bodies.

use std::fmt;

use toml::Value;

use super::cast::cast;
use super::env::{resolve, EnvSource};
use super::error::CastError;
use super::ConfigError;

/// Name of the control field that suppresses presence validation.
pub const IGNORE_ERRORS_FLAG: &str = "env_ignore_errors";

/// Conversion used by [`FieldType::Custom`].
pub type CastFn = fn(Value) -> Result<Value, CastError>;

/// The declared type of a field.
#[derive(Clone, Copy)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    /// Any caster-compatible type: `cast` receives the raw value (an
    /// environment string or the literal default) and returns the bound value.
    Custom { name: &'static str, cast: CastFn },
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Custom { name, .. } => name,
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `(name, type, optional literal default)` triple.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    name: String,
    ty: FieldType,
    default: Option<Value>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: FieldType, default: Option<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> FieldType {
        self.ty
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Casts `raw` to this field's type, naming the field on failure.
    pub fn cast(&self, raw: Option<Value>) -> Result<Option<Value>, ConfigError> {
        cast(self.ty, raw).map_err(|e| ConfigError::cast(&self.name, e))
    }

    /// Resolves this field from `env` (falling back to the literal default)
    /// and casts the result.
    pub fn resolve(&self, env: &dyn EnvSource) -> Result<Option<Value>, ConfigError> {
        self.cast(resolve(env, &self.name, self.default.as_ref())?)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.name) {
            return Err(ConfigError::InvalidFieldName(self.name.clone()));
        }
        if self.name.eq_ignore_ascii_case(IGNORE_ERRORS_FLAG) {
            return Err(ConfigError::ReservedField(self.name.clone()));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
