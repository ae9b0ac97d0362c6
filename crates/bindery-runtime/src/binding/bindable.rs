//! The bindable capability.

use bindery_core::{BindError, Key, Value};

use super::state::BindingCore;
use crate::policy::BindFailure;

/// An object whose keyed properties can be bound to other objects.
///
/// Implementors supply key lookup, their own storage and a [`BindingCore`];
/// the guarded setters are provided. All methods take `&self`: a set can
/// re-enter the same object through a binding cycle, so implementors keep
/// their state in `Cell`/`RefCell`.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use bindery_runtime::{Bindable, BindError, BindingCore, Key, Value};
///
/// const LABEL: Key = Key::typed("label", "text");
/// const TAG_KEYS: &[Key] = &[LABEL];
///
/// #[derive(Default)]
/// struct Tag {
///     core: BindingCore,
///     label: RefCell<Option<String>>,
/// }
///
/// impl Bindable for Tag {
///     fn binding_core(&self) -> &BindingCore {
///         &self.core
///     }
///
///     fn bindable_keys(&self) -> &[Key] {
///         TAG_KEYS
///     }
///
///     fn value(&self, key: &Key) -> Option<Value> {
///         if *key == LABEL {
///             self.label.borrow().clone().map(Value::new)
///         } else {
///             None
///         }
///     }
///
///     fn set_own(&self, value: Value, key: &Key) -> Result<(), BindError> {
///         if *key != LABEL {
///             return Err(BindError::invalid_key(key));
///         }
///         *self.label.borrow_mut() = Some(value.cast(key, "text")?);
///         Ok(())
///     }
/// }
///
/// let tag = Tag::default();
/// tag.set(Value::new(String::from("urgent")), &LABEL).unwrap();
/// assert_eq!(tag.label.borrow().as_deref(), Some("urgent"));
/// ```
pub trait Bindable {
    /// Engine state for this object.
    fn binding_core(&self) -> &BindingCore;

    /// The declared keys that take part in bindings.
    fn bindable_keys(&self) -> &[Key];

    /// Current stored value for `key`. Must not fail or have side effects.
    fn value(&self, key: &Key) -> Option<Value>;

    /// Store `value` in the object's own state, without fan-out.
    ///
    /// Fails when the value's type or content is unacceptable for `key`, or
    /// when `key` is unknown to the object.
    fn set_own(&self, value: Value, key: &Key) -> Result<(), BindError>;

    /// Whether `key` is one of [`bindable_keys`](Self::bindable_keys).
    fn is_bindable(&self, key: &Key) -> bool {
        self.bindable_keys().contains(key)
    }

    /// Application-initiated set.
    ///
    /// Keys that are not bindable are stored without fan-out. Bindable keys
    /// are guarded, stored, and then fanned out to every downstream action.
    /// A bindable key that is already mid-update is a no-op.
    fn set(&self, value: Value, key: &Key) -> Result<(), BindError> {
        if !self.is_bindable(key) {
            return self.set_own(value, key);
        }
        commit(self, value, key)
    }

    /// Binding-initiated set.
    ///
    /// Same as [`set`](Self::set) for bindable keys; a no-op for any other
    /// key. Failures from this object's store or from any downstream target
    /// are returned.
    fn set_bound_value(&self, value: Value, key: &Key) -> Result<(), BindError> {
        if !self.is_bindable(key) {
            tracing::trace!(
                object = %self.binding_core().id(),
                key = %key,
                "bound value for undeclared key ignored"
            );
            return Ok(());
        }
        commit(self, value, key)
    }

    /// [`set_bound_value`](Self::set_bound_value) that never returns an
    /// error; failures go to the object's [`ErrorPolicy`](crate::ErrorPolicy).
    fn try_set_bound_value(&self, value: Value, key: &Key) {
        if let Err(error) = self.set_bound_value(value.clone(), key) {
            self.binding_core().report(BindFailure {
                error,
                value,
                key: key.clone(),
            });
        }
    }
}

/// Guarded store + fan-out for a bindable key.
fn commit<B: Bindable + ?Sized>(object: &B, value: Value, key: &Key) -> Result<(), BindError> {
    let core = object.binding_core();
    let Some(_entered) = core.enter(key) else {
        tracing::trace!(object = %core.id(), key = %key, "reentrant set suppressed");
        return Ok(());
    };

    object.set_own(value.clone(), key)?;
    tracing::trace!(
        object = %core.id(),
        key = %key,
        value = value.type_name(),
        "value stored"
    );
    core.fan_out(key, &value)
}
