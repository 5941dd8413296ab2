use thiserror::Error;

/// Failure to convert a raw value into a field's declared type.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CastError {
    #[error("invalid integer literal: {0:?}")]
    InvalidInteger(String),

    #[error("float {0} is outside the integer range")]
    IntegerOutOfRange(f64),

    #[error("invalid float literal: {0:?}")]
    InvalidFloat(String),

    #[error("unrecognized boolean token: {0:?}")]
    UnknownBoolToken(String),

    #[error("cannot cast {found} value to {expected}")]
    Unsupported {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("The following environment variables are undefined: {}", .0.join(", "))]
    UndefinedFields(Vec<String>),

    #[error("failed to cast field '{field}': {source}")]
    Cast {
        field: String,
        #[source]
        source: CastError,
    },

    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),

    #[error("field declared more than once: {0}")]
    DuplicateField(String),

    #[error("field name is reserved: {0}")]
    ReservedField(String),

    #[error("environment variable is not valid unicode: {0}")]
    NotUnicode(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn cast(field: &str, source: CastError) -> Self {
        Self::Cast {
            field: field.to_string(),
            source,
        }
    }
}
