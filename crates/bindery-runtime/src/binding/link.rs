//! Creating and breaking links between bindable objects.

use std::rc::Rc;

use bindery_core::{BindError, Key};

use super::action::BindingAction;
use super::bindable::Bindable;

/// Link management for `Rc`-shared bindable objects.
///
/// # Invariants
///
/// 1. Right after `bind` or `bind_one_way` returns `Ok`, the target's value
///    for `target_key` equals the source's value for `key` (when the source
///    has one).
/// 2. A two-way link is two one-way actions: source → target registered on
///    the source, target → source registered on the target.
/// 3. If the initial push fails, the actions registered by that call are
///    removed again before the error is returned. Identical actions that
///    existed before the call are left in place.
/// 4. `unbind` / `unbind_one_way` on a link that does not exist are no-ops.
pub trait BindableExt {
    /// Two-way link between `key` on `self` and `target_key` on `target`.
    ///
    /// Both keys must be bindable on their objects, else
    /// [`BindError::InvalidKey`] names the offending key. The returned
    /// [`Registered`] says which directions this call added; with link
    /// deduplication on, an existing direction is reported as not added.
    fn bind<T: Bindable + 'static>(
        &self,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
    ) -> Result<Registered, BindError>;

    /// One-way link: changes to `key` on `self` flow to `target_key` on
    /// `target`, never back.
    fn bind_one_way<T: Bindable + 'static>(
        &self,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
    ) -> Result<Registered, BindError>;

    /// Remove both directions of a link. Returns whether anything was removed.
    fn unbind<T: Bindable + 'static>(&self, key: &Key, target: &Rc<T>, target_key: &Key) -> bool;

    /// Remove the `self` → `target` direction only.
    fn unbind_one_way<T: Bindable + 'static>(
        &self,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
    ) -> bool;
}

/// Which actions a `bind` or `bind_one_way` call added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registered {
    /// `self` → `target`, stored on the source.
    pub forward: bool,
    /// `target` → `self`, stored on the target. Always `false` for one-way.
    pub reverse: bool,
}

impl Registered {
    /// Whether the call added anything.
    #[must_use]
    pub fn any(self) -> bool {
        self.forward || self.reverse
    }
}

impl<S: Bindable + 'static> BindableExt for Rc<S> {
    fn bind<T: Bindable + 'static>(
        &self,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
    ) -> Result<Registered, BindError> {
        if !self.is_bindable(key) {
            return Err(BindError::invalid_key(key));
        }
        if !target.is_bindable(target_key) {
            return Err(BindError::invalid_key(target_key));
        }

        let source_id = self.binding_core().id();
        let target_core = target.binding_core();
        let reverse = target_core.register(target_key, BindingAction::to(self, key.clone()));

        let forward = match self.bind_one_way(key, target, target_key) {
            Ok(added) => added.forward,
            Err(err) => {
                if reverse {
                    target_core.remove_last(target_key, source_id, key);
                }
                return Err(err);
            }
        };
        tracing::debug!(
            source = %source_id,
            key = %key,
            target = %target_core.id(),
            target_key = %target_key,
            forward,
            reverse,
            "two-way link established"
        );
        Ok(Registered { forward, reverse })
    }

    fn bind_one_way<T: Bindable + 'static>(
        &self,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
    ) -> Result<Registered, BindError> {
        if !self.is_bindable(key) {
            return Err(BindError::invalid_key(key));
        }

        let core = self.binding_core();
        let action = BindingAction::to(target, target_key.clone());
        let registered = core.register(key, action.clone());

        if let Err(err) = push_current(&**self, key, &action) {
            if registered {
                core.remove_last(key, action.target_id(), target_key);
            }
            return Err(err);
        }
        tracing::debug!(
            source = %core.id(),
            key = %key,
            target = %action.target_id(),
            target_key = %target_key,
            registered,
            "one-way link established"
        );
        Ok(Registered {
            forward: registered,
            reverse: false,
        })
    }

    fn unbind<T: Bindable + 'static>(&self, key: &Key, target: &Rc<T>, target_key: &Key) -> bool {
        let forward = self.unbind_one_way(key, target, target_key);
        let reverse = target
            .binding_core()
            .remove(target_key, self.binding_core().id(), key);
        forward || reverse
    }

    fn unbind_one_way<T: Bindable + 'static>(
        &self,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
    ) -> bool {
        let removed = self
            .binding_core()
            .remove(key, target.binding_core().id(), target_key);
        if removed {
            tracing::debug!(
                source = %self.binding_core().id(),
                key = %key,
                target = %target.binding_core().id(),
                target_key = %target_key,
                "link removed"
            );
        }
        removed
    }
}

/// Push the source's current value through one freshly registered action.
///
/// Runs under the source key's guard so the echo from a reverse action
/// stops at the source.
fn push_current<S: Bindable + ?Sized>(
    source: &S,
    key: &Key,
    action: &BindingAction,
) -> Result<(), BindError> {
    let Some(value) = source.value(key) else {
        return Ok(());
    };
    let _entered = source.binding_core().enter(key);
    action
        .apply(&value)
        .map(drop)
        .map_err(|err| BindError::propagation(key, action.target_key(), err))
}
