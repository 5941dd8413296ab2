use std::collections::HashSet;
use std::sync::Arc;

use toml::Value;

use super::env::{EnvSource, StdEnv};
use super::field::{FieldDecl, FieldType};
use super::instance::{EnvInstance, InstanceBuilder};
use super::mode::{BindingMode, OverridePolicy};
use super::ConfigError;

#[derive(Debug)]
pub(crate) struct ClassDef {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) env: Arc<dyn EnvSource>,
    pub(crate) mode: BindingMode,
    pub(crate) policy: OverridePolicy,
}

/// A declared configuration class: an ordered list of fields bound to the
/// environment with one [`BindingMode`].
///
/// Cloning is cheap; clones share the same declaration.
///
/// ## Example
///
/// ```no_run
/// use envclasses::{EnvClass, FieldType};
///
/// let class = EnvClass::builder("ServerConfig")
///     .field_with_default("host", FieldType::String, "localhost")
///     .field_with_default("port", FieldType::Integer, 8080)
///     .field("debug", FieldType::Boolean)
///     .build()?;
///
/// // HOST / host, PORT / port and DEBUG / debug are read here
/// let config = class.construct()?;
/// let port: Option<u16> = config.get("port")?;
/// # Ok::<(), envclasses::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EnvClass {
    def: Arc<ClassDef>,
}

impl EnvClass {
    /// Creates a new class builder.
    pub fn builder(name: impl Into<String>) -> EnvClassBuilder {
        EnvClassBuilder {
            name: name.into(),
            fields: Vec::new(),
            env: None,
            mode: None,
            policy: OverridePolicy::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.def.fields
    }

    pub fn mode(&self) -> BindingMode {
        self.def.mode
    }

    pub fn override_policy(&self) -> OverridePolicy {
        self.def.policy
    }

    /// Starts constructing an instance, allowing explicit field values and
    /// an explicit ignore-errors setting.
    pub fn instance(&self) -> InstanceBuilder {
        InstanceBuilder::new(self.clone())
    }

    /// Constructs an instance from the environment alone.
    pub fn construct(&self) -> Result<EnvInstance, ConfigError> {
        self.instance().build()
    }

    pub(crate) fn def(&self) -> &ClassDef {
        &self.def
    }

    pub(crate) fn index_of(&self, name: &str) -> Result<usize, ConfigError> {
        self.def
            .fields
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| ConfigError::UnknownField(name.to_string()))
    }
}

/// Builder for an [`EnvClass`].
///
/// Fields keep their declaration order, which is also the order in which
/// undefined fields are reported.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct EnvClassBuilder {
    name: String,
    fields: Vec<FieldDecl>,
    env: Option<Arc<dyn EnvSource>>,
    mode: Option<BindingMode>,
    policy: OverridePolicy,
}

impl EnvClassBuilder {
    /// Declares a field without a default: it must come from the environment.
    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.declare(FieldDecl::new(name, ty, None))
    }

    /// Declares a field whose literal default is used when neither the
    /// upper- nor the lower-cased variable is set.
    pub fn field_with_default(
        self,
        name: impl Into<String>,
        ty: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        self.declare(FieldDecl::new(name, ty, Some(default.into())))
    }

    pub fn declare(mut self, decl: FieldDecl) -> Self {
        self.fields.push(decl);
        self
    }

    /// Reads variables from `env` instead of the process environment.
    pub fn env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Some(Arc::new(env));
        self
    }

    /// Fixes the binding mode. Without this, [`build`](Self::build) reads it
    /// from the environment.
    pub fn mode(mut self, mode: BindingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets how long explicit writes to lazily bound fields survive.
    pub fn override_policy(mut self, policy: OverridePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validates the declarations and fixes the binding mode.
    ///
    /// The mode selector is read here, once; changing it afterwards has no
    /// effect on this class.
    pub fn build(self) -> Result<EnvClass, ConfigError> {
        let mut seen = HashSet::new();
        for decl in &self.fields {
            decl.validate()?;
            if !seen.insert(decl.name().to_lowercase()) {
                return Err(ConfigError::DuplicateField(decl.name().to_string()));
            }
        }

        let env = self
            .env
            .unwrap_or_else(|| Arc::new(StdEnv) as Arc<dyn EnvSource>);
        let mode = match self.mode {
            Some(mode) => mode,
            None => BindingMode::from_env(env.as_ref())?,
        };

        tracing::debug!(
            class = %self.name,
            ?mode,
            fields = self.fields.len(),
            "built env class"
        );

        Ok(EnvClass {
            def: Arc::new(ClassDef {
                name: self.name,
                fields: self.fields,
                env,
                mode,
                policy: self.policy,
            }),
        })
    }
}
