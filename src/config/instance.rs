use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::builder::EnvClass;
use super::eager::EagerFields;
use super::field::IGNORE_ERRORS_FLAG;
use super::lazy::LazyFields;
use super::mode::{read_flag, BindingMode};
use super::validate::check_presence;
use super::ConfigError;

#[derive(Debug)]
enum Bindings {
    Eager(EagerFields),
    Lazy(LazyFields),
}

/// Builder for an [`EnvInstance`].
///
/// Explicit values given with [`set`](Self::set) take the place of the
/// environment for their field, like constructor arguments.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct InstanceBuilder {
    class: EnvClass,
    values: Vec<(String, Value)>,
    ignore_errors: Option<bool>,
}

impl InstanceBuilder {
    pub(crate) fn new(class: EnvClass) -> Self {
        Self {
            class,
            values: Vec::new(),
            ignore_errors: None,
        }
    }

    /// Supplies a field value explicitly. It is cast to the field's type.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Overrides the `ENV_IGNORE_ERRORS` control variable.
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = Some(ignore);
        self
    }

    /// Binds every field and runs presence validation.
    ///
    /// Fails with [`ConfigError::UndefinedFields`] naming every field that
    /// resolved to nothing, unless errors are ignored.
    pub fn build(self) -> Result<EnvInstance, ConfigError> {
        let def = self.class.def();

        let mut overrides = vec![None; def.fields.len()];
        for (name, value) in self.values {
            let index = self.class.index_of(&name)?;
            overrides[index] = def.fields[index].cast(Some(value))?;
        }

        let ignore_errors = match self.ignore_errors {
            Some(ignore) => ignore,
            None => read_flag(def.env.as_ref(), IGNORE_ERRORS_FLAG)?,
        };

        let bindings = match def.mode {
            BindingMode::Eager => {
                Bindings::Eager(EagerFields::bind(&def.fields, def.env.as_ref(), overrides)?)
            }
            BindingMode::Lazy => Bindings::Lazy(LazyFields::new(overrides, def.policy)),
        };

        tracing::debug!(
            class = %def.name,
            mode = ?def.mode,
            ignore_errors,
            "constructing env instance"
        );

        let instance = EnvInstance {
            class: self.class,
            bindings,
            ignore_errors,
        };
        instance.check_presence()?;
        Ok(instance)
    }
}

/// A constructed configuration: one bound value per declared field.
///
/// Values are `toml::Value`s of the declared type, or `None` when nothing
/// resolved. Eager instances never look at the environment again; lazy
/// instances re-read it on every [`value`](Self::value) call.
#[derive(Debug)]
pub struct EnvInstance {
    class: EnvClass,
    bindings: Bindings,
    ignore_errors: bool,
}

impl EnvInstance {
    pub fn class(&self) -> &EnvClass {
        &self.class
    }

    pub fn mode(&self) -> BindingMode {
        self.class.mode()
    }

    /// Whether presence validation was skipped for this instance.
    pub fn ignore_errors(&self) -> bool {
        self.ignore_errors
    }

    /// Reads a field's bound value.
    ///
    /// For lazily bound fields this resolves and casts the environment again,
    /// so cast errors can surface here.
    pub fn value(&self, name: &str) -> Result<Option<Value>, ConfigError> {
        let index = self.class.index_of(name)?;
        self.read(index)
    }

    /// Reads a field and deserializes it into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        self.value(name)?.map(decode::<T>).transpose()
    }

    /// Writes a field explicitly, casting `value` to the field's type.
    ///
    /// For lazily bound fields, how long the write survives depends on the
    /// class's [`OverridePolicy`](super::OverridePolicy).
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let index = self.class.index_of(name)?;
        let value = self.class.def().fields[index].cast(Some(value.into()))?;
        match &mut self.bindings {
            Bindings::Eager(fields) => fields.set(index, value),
            Bindings::Lazy(fields) => fields.write(index, value),
        }
        Ok(())
    }

    /// Drops an explicit write so the next read goes back to the environment.
    /// Eager instances have nothing to refresh.
    pub fn refresh(&mut self, name: &str) -> Result<(), ConfigError> {
        let index = self.class.index_of(name)?;
        if let Bindings::Lazy(fields) = &mut self.bindings {
            fields.refresh(index);
        }
        Ok(())
    }

    pub fn refresh_all(&mut self) {
        if let Bindings::Lazy(fields) = &mut self.bindings {
            fields.refresh_all();
        }
    }

    /// The stored value without consulting the environment: the frozen value
    /// for eager fields, the shadow slot for lazy ones.
    pub fn cached(&self, name: &str) -> Result<Option<Value>, ConfigError> {
        let index = self.class.index_of(name)?;
        Ok(match &self.bindings {
            Bindings::Eager(fields) => fields.get(index).cloned(),
            Bindings::Lazy(fields) => fields.cached(index),
        })
    }

    /// Collects every present field into a table. Absent fields are left out.
    pub fn to_table(&self) -> Result<Table, ConfigError> {
        let mut table = Table::new();
        for (index, decl) in self.class.fields().iter().enumerate() {
            if let Some(value) = self.read(index)? {
                table.insert(decl.name().to_string(), value);
            }
        }
        Ok(table)
    }

    /// Deserializes the whole instance into `T`.
    ///
    /// Absent fields are missing from the input, so they map to `None` for
    /// `Option` fields and fail for required ones.
    ///
    /// ```no_run
    /// use envclasses::{EnvClass, FieldType};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Server {
    ///     host: String,
    ///     port: u16,
    ///     token: Option<String>,
    /// }
    ///
    /// let server: Server = EnvClass::builder("Server")
    ///     .field_with_default("host", FieldType::String, "0.0.0.0")
    ///     .field_with_default("port", FieldType::Integer, 8080)
    ///     .field("token", FieldType::String)
    ///     .build()?
    ///     .instance()
    ///     .ignore_errors(true)
    ///     .build()?
    ///     .deserialize()?;
    /// # Ok::<(), envclasses::ConfigError>(())
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        decode(Value::Table(self.to_table()?))
    }

    fn read(&self, index: usize) -> Result<Option<Value>, ConfigError> {
        let def = self.class.def();
        match &self.bindings {
            Bindings::Eager(fields) => Ok(fields.get(index).cloned()),
            Bindings::Lazy(fields) => fields.read(index, &def.fields[index], def.env.as_ref()),
        }
    }

    fn check_presence(&self) -> Result<(), ConfigError> {
        let def = self.class.def();
        let mut present = Vec::with_capacity(def.fields.len());
        for (index, decl) in def.fields.iter().enumerate() {
            let value = match &self.bindings {
                Bindings::Eager(fields) => fields.get(index).cloned(),
                Bindings::Lazy(fields) => fields.current(index, decl, def.env.as_ref())?,
            };
            present.push((decl.name(), value.is_some()));
        }
        check_presence(present, self.ignore_errors)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ConfigError> {
    value.try_into().map_err(ConfigError::DeserializeError)
}
