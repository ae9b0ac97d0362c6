//! Downstream binding actions.

use std::fmt;
use std::rc::{Rc, Weak};

use bindery_core::{BindError, Key, Value};

use super::bindable::Bindable;
use super::state::ObjectId;

/// Outcome of applying an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Delivery {
    Delivered,
    TargetDropped,
}

/// One registered `(target object, target key)` pair.
///
/// Stored in the source object's list for a source key. Identity is the
/// plain record `(target id, target key)`; the target itself is held weakly.
#[derive(Clone)]
pub struct BindingAction {
    target: Weak<dyn Bindable>,
    target_id: ObjectId,
    target_key: Key,
}

impl BindingAction {
    /// Action delivering to `target_key` on `target`.
    pub fn to<T: Bindable + 'static>(target: &Rc<T>, target_key: Key) -> Self {
        Self {
            target: downgrade(target),
            target_id: target.binding_core().id(),
            target_key,
        }
    }

    /// Identity of the target object.
    #[must_use]
    pub fn target_id(&self) -> ObjectId {
        self.target_id
    }

    /// Key written on the target.
    #[must_use]
    pub fn target_key(&self) -> &Key {
        &self.target_key
    }

    /// Whether this action delivers to `(target, target_key)`.
    #[must_use]
    pub fn matches(&self, target: ObjectId, target_key: &Key) -> bool {
        self.target_id == target && self.target_key == *target_key
    }

    /// Whether the target object is still alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Push `value` into the target through its guarded bound-value setter.
    pub(crate) fn apply(&self, value: &Value) -> Result<Delivery, BindError> {
        let Some(target) = self.target.upgrade() else {
            return Ok(Delivery::TargetDropped);
        };
        target.set_bound_value(value.clone(), &self.target_key)?;
        Ok(Delivery::Delivered)
    }
}

impl fmt::Debug for BindingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingAction")
            .field("target", &self.target_id)
            .field("target_key", &self.target_key.name())
            .field("live", &self.is_live())
            .finish()
    }
}

pub(crate) fn downgrade<T: Bindable + 'static>(object: &Rc<T>) -> Weak<dyn Bindable> {
    let erased: Rc<dyn Bindable> = Rc::clone(object) as Rc<dyn Bindable>;
    Rc::downgrade(&erased)
}
