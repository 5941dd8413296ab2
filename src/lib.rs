pub mod config;

pub use config::{
    BindingMode, CastError, ConfigError, EnvClass, EnvInstance, EnvSource, FieldType, MapEnv,
    OverridePolicy, StdEnv,
};
