//! A ready-made bindable object backed by a key → value map.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bindery_core::{BindError, CoercionRegistry, Key, Value};

use crate::binding::{Bindable, BindingCore};
use crate::config::EngineConfig;

/// Map-backed bindable object.
///
/// Any key can be stored; only the keys given at construction take part in
/// bindings. With a [`CoercionRegistry`] attached, raw document values are
/// coerced on store and domain values of the wrong type are rejected for
/// keys that have a rule.
pub struct Record {
    core: BindingCore,
    bindable: Vec<Key>,
    values: RefCell<HashMap<Key, Value>>,
    coercions: Option<Rc<CoercionRegistry>>,
}

impl Record {
    /// Create a record with the given bindable keys.
    pub fn new(bindable: impl IntoIterator<Item = Key>) -> Self {
        Self::with_core(BindingCore::new(), bindable)
    }

    /// Create a record whose core uses `config`.
    pub fn with_config(bindable: impl IntoIterator<Item = Key>, config: &EngineConfig) -> Self {
        Self::with_core(BindingCore::with_config(config), bindable)
    }

    fn with_core(core: BindingCore, bindable: impl IntoIterator<Item = Key>) -> Self {
        Self {
            core,
            bindable: bindable.into_iter().collect(),
            values: RefCell::new(HashMap::new()),
            coercions: None,
        }
    }

    /// Attach a coercion registry used by `set_own`.
    #[must_use]
    pub fn with_coercions(mut self, registry: Rc<CoercionRegistry>) -> Self {
        self.coercions = Some(registry);
        self
    }

    /// The stored value for `key`, cloned out as a `T`.
    #[must_use]
    pub fn get<T: Any + Clone>(&self, key: &Key) -> Option<T> {
        self.values.borrow().get(key).and_then(Value::get::<T>)
    }

    /// Whether a value is stored for `key`.
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.values.borrow().contains_key(key)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    fn validate(&self, key: &Key, value: Value) -> Result<Value, BindError> {
        let Some(registry) = &self.coercions else {
            return Ok(value);
        };
        let value = registry.resolve(key, value)?;
        match registry.rule(key) {
            Some(rule) if rule.encode(&value).is_none() => Err(BindError::type_mismatch(
                key,
                rule.expects(),
                value.type_name(),
            )),
            _ => Ok(value),
        }
    }
}

impl Bindable for Record {
    fn binding_core(&self) -> &BindingCore {
        &self.core
    }

    fn bindable_keys(&self) -> &[Key] {
        &self.bindable
    }

    fn value(&self, key: &Key) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    fn set_own(&self, value: Value, key: &Key) -> Result<(), BindError> {
        let value = self.validate(key, value)?;
        self.values.borrow_mut().insert(key.clone(), value);
        Ok(())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("core", &self.core)
            .field("bindable", &self.bindable)
            .field("values", &self.values.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::CoercionRule;
    use serde_json::json;

    const NAME: Key = Key::typed("name", "text");
    const NOTE: Key = Key::new("note");

    #[test]
    fn stores_any_value_without_registry() {
        let rec = Record::new([NAME]);
        rec.set(Value::new(3_i64), &NAME).unwrap();
        rec.set(Value::new(true), &NOTE).unwrap();
        assert_eq!(rec.get::<i64>(&NAME), Some(3));
        assert_eq!(rec.get::<bool>(&NOTE), Some(true));
        assert_eq!(rec.len(), 2);
        assert!(rec.contains(&NOTE));
    }

    #[test]
    fn undeclared_key_set_bound_value_is_noop() {
        let rec = Record::new([NAME]);
        rec.set_bound_value(Value::new(1_i64), &NOTE).unwrap();
        assert!(!rec.contains(&NOTE));
        assert!(rec.is_empty());
    }

    #[test]
    fn registry_coerces_raw_values() {
        let mut registry = CoercionRegistry::new();
        registry.register(NAME, CoercionRule::text());
        let rec = Record::new([NAME]).with_coercions(Rc::new(registry));

        rec.set(Value::raw(json!("Deploys")), &NAME).unwrap();
        assert_eq!(rec.get::<String>(&NAME).as_deref(), Some("Deploys"));

        let err = rec.set(Value::raw(json!(12)), &NAME).unwrap_err();
        assert_eq!(err, BindError::type_mismatch(&NAME, "text", "number"));

        let err = rec.set(Value::new(12_i64), &NAME).unwrap_err();
        assert_eq!(err, BindError::type_mismatch(&NAME, "text", "i64"));
        assert_eq!(rec.get::<String>(&NAME).as_deref(), Some("Deploys"));
    }

    #[test]
    fn with_config_uses_given_settings() {
        let config = EngineConfig::from_vars(Some("log"), None);
        let rec = Record::with_config([NAME], &config);
        assert!(matches!(
            rec.binding_core().error_policy(),
            crate::policy::ErrorPolicy::Log
        ));
    }

    #[test]
    fn debug_format() {
        let rec = Record::new([NAME]);
        let debug = format!("{rec:?}");
        assert!(debug.contains("Record"), "{debug}");
        assert!(debug.contains("values: 0"), "{debug}");
    }
}
