//! Live binding: every read goes back to the environment.
//!
//! Each field owns a shadow slot holding the value of its last read or an
//! explicit write. Whether a write survives the next read depends on the
//! [`OverridePolicy`].

use std::cell::RefCell;

use toml::Value;

use super::env::EnvSource;
use super::field::FieldDecl;
use super::mode::OverridePolicy;
use super::ConfigError;

#[derive(Debug, Clone, Default)]
struct Slot {
    value: Option<Value>,
    overridden: bool,
}

#[derive(Debug)]
pub(crate) struct LazyFields {
    slots: RefCell<Vec<Slot>>,
    policy: OverridePolicy,
}

impl LazyFields {
    /// Creates unread slots. Explicit overrides (already cast) start out as
    /// writes.
    pub(crate) fn new(overrides: Vec<Option<Value>>, policy: OverridePolicy) -> Self {
        let slots = overrides
            .into_iter()
            .map(|explicit| Slot {
                overridden: explicit.is_some(),
                value: explicit,
            })
            .collect();

        Self {
            slots: RefCell::new(slots),
            policy,
        }
    }

    /// Re-resolves the field from `env` and caches the result, unless a
    /// write is still in force.
    pub(crate) fn read(
        &self,
        index: usize,
        decl: &FieldDecl,
        env: &dyn EnvSource,
    ) -> Result<Option<Value>, ConfigError> {
        let mut slots = self.slots.borrow_mut();
        let slot = &mut slots[index];

        if slot.overridden && self.policy == OverridePolicy::UntilRefresh {
            return Ok(slot.value.clone());
        }

        let value = decl.resolve(env)?;
        *slot = Slot {
            value: value.clone(),
            overridden: false,
        };
        Ok(value)
    }

    /// Like [`read`](Self::read), but any pending write is returned as-is
    /// regardless of the policy. Used by the construction-time presence check
    /// so constructor overrides are not discarded before the caller sees them.
    pub(crate) fn current(
        &self,
        index: usize,
        decl: &FieldDecl,
        env: &dyn EnvSource,
    ) -> Result<Option<Value>, ConfigError> {
        {
            let slots = self.slots.borrow();
            if slots[index].overridden {
                return Ok(slots[index].value.clone());
            }
        }
        self.read(index, decl, env)
    }

    pub(crate) fn write(&mut self, index: usize, value: Option<Value>) {
        self.slots.get_mut()[index] = Slot {
            value,
            overridden: true,
        };
    }

    pub(crate) fn refresh(&mut self, index: usize) {
        self.slots.get_mut()[index].overridden = false;
    }

    pub(crate) fn refresh_all(&mut self) {
        for slot in self.slots.get_mut() {
            slot.overridden = false;
        }
    }

    /// The shadow slot's content, without touching the environment.
    pub(crate) fn cached(&self, index: usize) -> Option<Value> {
        self.slots.borrow()[index].value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldType, MapEnv};

    fn int_field() -> FieldDecl {
        FieldDecl::new("int_field", FieldType::Integer, None)
    }

    #[test]
    fn test_read_follows_environment() {
        let env = MapEnv::new();
        let decl = int_field();
        let fields = LazyFields::new(vec![None], OverridePolicy::default());

        assert_eq!(fields.read(0, &decl, &env).unwrap(), None);

        env.set("int_field", "100");
        assert_eq!(fields.read(0, &decl, &env).unwrap(), Some(Value::Integer(100)));

        env.set("INT_FIELD", "200");
        assert_eq!(fields.read(0, &decl, &env).unwrap(), Some(Value::Integer(200)));
        assert_eq!(fields.cached(0), Some(Value::Integer(200)));
    }

    #[test]
    fn test_write_persists_until_refresh() {
        let env: MapEnv = [("int_field", "100")].into_iter().collect();
        let decl = int_field();
        let mut fields = LazyFields::new(vec![None], OverridePolicy::UntilRefresh);

        fields.write(0, Some(Value::Integer(0)));
        assert_eq!(fields.read(0, &decl, &env).unwrap(), Some(Value::Integer(0)));
        assert_eq!(fields.read(0, &decl, &env).unwrap(), Some(Value::Integer(0)));

        fields.refresh(0);
        assert_eq!(fields.read(0, &decl, &env).unwrap(), Some(Value::Integer(100)));
    }

    #[test]
    fn test_write_discarded_on_next_read() {
        let env: MapEnv = [("int_field", "100")].into_iter().collect();
        let decl = int_field();
        let mut fields = LazyFields::new(vec![None], OverridePolicy::UntilNextRead);

        fields.write(0, Some(Value::Integer(0)));
        assert_eq!(fields.cached(0), Some(Value::Integer(0)));
        assert_eq!(fields.read(0, &decl, &env).unwrap(), Some(Value::Integer(100)));
        assert_eq!(fields.cached(0), Some(Value::Integer(100)));
    }

    #[test]
    fn test_current_keeps_pending_write() {
        let env: MapEnv = [("int_field", "100")].into_iter().collect();
        let decl = int_field();
        let fields = LazyFields::new(
            vec![Some(Value::Integer(5))],
            OverridePolicy::UntilNextRead,
        );

        assert_eq!(fields.current(0, &decl, &env).unwrap(), Some(Value::Integer(5)));
        assert_eq!(fields.read(0, &decl, &env).unwrap(), Some(Value::Integer(100)));
    }

    #[test]
    fn test_cast_error_leaves_slot_untouched() {
        let env: MapEnv = [("int_field", "7")].into_iter().collect();
        let decl = int_field();
        let fields = LazyFields::new(vec![None], OverridePolicy::default());

        fields.read(0, &decl, &env).unwrap();
        env.set("int_field", "seven");
        assert!(matches!(
            fields.read(0, &decl, &env),
            Err(ConfigError::Cast { .. })
        ));
        assert_eq!(fields.cached(0), Some(Value::Integer(7)));
    }
}
