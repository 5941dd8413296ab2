//! Declarative configuration classes bound to environment variables.

mod builder;
mod cast;
mod eager;
mod env;
mod error;
mod field;
mod instance;
mod lazy;
mod mode;
mod validate;

pub use builder::{EnvClass, EnvClassBuilder};
pub use cast::{cast, cast_bool, BOOL_TOKENS};
pub use env::{EnvSource, MapEnv, StdEnv};
pub use error::{CastError, ConfigError};
pub use field::{CastFn, FieldDecl, FieldType, IGNORE_ERRORS_FLAG};
pub use instance::{EnvInstance, InstanceBuilder};
pub use mode::{BindingMode, OverridePolicy, LAZY_MODE_FLAG};
