//! Per-object binding state: the action table and the reentrancy guard.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bindery_core::{BindError, Key, Value};

use super::action::{BindingAction, Delivery};
use crate::config::EngineConfig;
use crate::policy::{BindFailure, ErrorPolicy};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a bindable object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Engine state owned by every bindable object.
///
/// Holds the ordered list of downstream [`BindingAction`]s per key, the stack
/// of keys currently being set, and the policy for failures reported through
/// [`Bindable::try_set_bound_value`](super::Bindable::try_set_bound_value).
pub struct BindingCore {
    id: ObjectId,
    actions: RefCell<HashMap<Key, Vec<BindingAction>>>,
    keys_being_set: RefCell<Vec<Key>>,
    policy: RefCell<ErrorPolicy>,
    dedupe_links: Cell<bool>,
}

impl BindingCore {
    /// Create engine state using the thread's current [`EngineConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::current())
    }

    /// Create engine state from an explicit configuration.
    #[must_use]
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            id: ObjectId::next(),
            actions: RefCell::new(HashMap::new()),
            keys_being_set: RefCell::new(Vec::new()),
            policy: RefCell::new(ErrorPolicy::from(config.error_policy)),
            dedupe_links: Cell::new(config.dedupe_links),
        }
    }

    /// Identity of the owning object.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Replace the failure policy.
    pub fn set_error_policy(&self, policy: ErrorPolicy) {
        *self.policy.borrow_mut() = policy;
    }

    /// The current failure policy.
    #[must_use]
    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy.borrow().clone()
    }

    /// Number of downstream actions registered under `key`.
    #[must_use]
    pub fn binding_count(&self, key: &Key) -> usize {
        self.actions.borrow().get(key).map_or(0, Vec::len)
    }

    /// Keys with at least one downstream action.
    #[must_use]
    pub fn bound_keys(&self) -> Vec<Key> {
        self.actions
            .borrow()
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Whether `key` is currently mid-update on this object.
    #[must_use]
    pub fn is_being_set(&self, key: &Key) -> bool {
        self.keys_being_set.borrow().contains(key)
    }

    /// Keys currently mid-update, outermost first.
    #[must_use]
    pub fn keys_being_set(&self) -> Vec<Key> {
        self.keys_being_set.borrow().clone()
    }

    /// Mark `key` as being set.
    ///
    /// Returns `None` when `key` is already guarded. Otherwise the returned
    /// guard releases exactly this key when dropped.
    #[must_use = "dropping the guard releases the key immediately"]
    pub fn enter(&self, key: &Key) -> Option<KeyGuard<'_>> {
        let mut guarded = self.keys_being_set.borrow_mut();
        if guarded.contains(key) {
            return None;
        }
        guarded.push(key.clone());
        Some(KeyGuard {
            core: self,
            key: key.clone(),
        })
    }

    /// Append `action` under `key`.
    ///
    /// With link deduplication on, an action matching the same target and
    /// target key is not added twice. Returns whether the action was added.
    pub(crate) fn register(&self, key: &Key, action: BindingAction) -> bool {
        let mut actions = self.actions.borrow_mut();
        let list = actions.entry(key.clone()).or_default();
        if self.dedupe_links.get()
            && list
                .iter()
                .any(|a| a.matches(action.target_id(), action.target_key()))
        {
            return false;
        }
        list.push(action);
        true
    }

    /// Remove the actions under `key` that target `(target, target_key)`.
    ///
    /// Returns whether anything was removed.
    pub(crate) fn remove(&self, key: &Key, target: ObjectId, target_key: &Key) -> bool {
        let mut actions = self.actions.borrow_mut();
        let Some(list) = actions.get_mut(key) else {
            return false;
        };
        let before = list.len();
        list.retain(|a| !a.matches(target, target_key));
        let removed = list.len() != before;
        if list.is_empty() {
            actions.remove(key);
        }
        removed
    }

    /// Remove only the most recently registered action under `key` that
    /// targets `(target, target_key)`.
    ///
    /// Used to undo a single registration; earlier identical actions stay.
    pub(crate) fn remove_last(&self, key: &Key, target: ObjectId, target_key: &Key) -> bool {
        let mut actions = self.actions.borrow_mut();
        let Some(list) = actions.get_mut(key) else {
            return false;
        };
        let Some(position) = list.iter().rposition(|a| a.matches(target, target_key)) else {
            return false;
        };
        list.remove(position);
        if list.is_empty() {
            actions.remove(key);
        }
        true
    }

    /// Apply `value` to every action registered under `key`, in order.
    ///
    /// The list is snapshotted first, so actions may bind or unbind while the
    /// fan-out runs. The first failing target stops the fan-out; dropped
    /// targets seen before it are still pruned.
    pub(crate) fn fan_out(&self, key: &Key, value: &Value) -> Result<(), BindError> {
        let Some(actions) = self.actions.borrow().get(key).cloned() else {
            return Ok(());
        };

        let mut dropped = false;
        let mut outcome = Ok(());
        for action in &actions {
            tracing::trace!(
                source = %self.id,
                key = %key,
                target = %action.target_id(),
                target_key = %action.target_key(),
                "fan-out"
            );
            match action.apply(value) {
                Ok(Delivery::Delivered) => {}
                Ok(Delivery::TargetDropped) => dropped = true,
                Err(err) => {
                    outcome = Err(BindError::propagation(key, action.target_key(), err));
                    break;
                }
            }
        }

        if dropped {
            self.prune(key);
        }
        outcome
    }

    /// Hand a failure to the configured policy.
    pub(crate) fn report(&self, failure: BindFailure) {
        // Cloned out so a custom handler may touch this object again.
        let policy = self.error_policy();
        policy.handle(failure);
    }

    fn prune(&self, key: &Key) {
        let mut actions = self.actions.borrow_mut();
        if let Some(list) = actions.get_mut(key) {
            let before = list.len();
            list.retain(BindingAction::is_live);
            tracing::debug!(
                object = %self.id,
                key = %key,
                pruned = before - list.len(),
                "dropped targets pruned"
            );
            if list.is_empty() {
                actions.remove(key);
            }
        }
    }

    fn release(&self, key: &Key) {
        let mut guarded = self.keys_being_set.borrow_mut();
        let position = guarded.iter().rposition(|k| k == key);
        debug_assert!(position.is_some(), "released key '{key}' was not guarded");
        if let Some(position) = position {
            guarded.remove(position);
        }
    }
}

impl Default for BindingCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions = self.actions.borrow();
        f.debug_struct("BindingCore")
            .field("id", &self.id)
            .field("bound_keys", &actions.len())
            .field(
                "binding_count",
                &actions.values().map(Vec::len).sum::<usize>(),
            )
            .field("keys_being_set", &self.keys_being_set.borrow())
            .finish()
    }
}

/// RAII guard for one key entered via [`BindingCore::enter`].
#[must_use = "dropping the guard releases the key immediately"]
pub struct KeyGuard<'a> {
    core: &'a BindingCore,
    key: Key,
}

impl KeyGuard<'_> {
    /// The guarded key.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.core.release(&self.key);
    }
}

impl fmt::Debug for KeyGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGuard")
            .field("object", &self.core.id)
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K1: Key = Key::new("k1");
    const K2: Key = Key::new("k2");

    #[test]
    fn ids_are_unique() {
        let a = BindingCore::new();
        let b = BindingCore::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id().get() > 0);
        assert_eq!(a.id().to_string(), format!("#{}", a.id().get()));
    }

    #[test]
    fn enter_rejects_guarded_key() {
        let core = BindingCore::new();
        let guard = core.enter(&K1);
        assert!(guard.is_some());
        assert!(core.enter(&K1).is_none());
        assert!(core.is_being_set(&K1));
        drop(guard);
        assert!(!core.is_being_set(&K1));
        assert!(core.enter(&K1).is_some());
    }

    #[test]
    fn nested_guards_release_in_own_frames() {
        // push K1, push K2, pop K2, pop K1
        let core = BindingCore::new();
        let outer = core.enter(&K1).expect("k1 free");
        {
            let _inner = core.enter(&K2).expect("k2 free");
            assert_eq!(core.keys_being_set(), vec![K1, K2]);
        }
        assert_eq!(core.keys_being_set(), vec![K1]);
        assert!(core.is_being_set(&K1), "ancestor stays guarded");
        assert!(core.enter(&K1).is_none());
        drop(outer);
        assert!(core.keys_being_set().is_empty());
    }

    #[test]
    fn guard_reports_its_key() {
        let core = BindingCore::new();
        let guard = core.enter(&K2).expect("free");
        assert_eq!(guard.key(), &K2);
        assert!(format!("{guard:?}").contains("k2"));
    }

    #[test]
    fn fan_out_without_actions_is_ok() {
        let core = BindingCore::new();
        assert_eq!(core.fan_out(&K1, &Value::new(1_i64)), Ok(()));
        assert_eq!(core.binding_count(&K1), 0);
        assert!(core.bound_keys().is_empty());
    }

    #[test]
    fn config_sets_policy_and_dedupe() {
        let config = EngineConfig {
            error_policy: crate::config::ErrorPolicyKind::Log,
            dedupe_links: false,
        };
        let core = BindingCore::with_config(&config);
        assert!(matches!(core.error_policy(), ErrorPolicy::Log));
        assert!(!core.dedupe_links.get());
    }

    #[test]
    fn debug_format() {
        let core = BindingCore::new();
        let _g = core.enter(&K1);
        let debug = format!("{core:?}");
        assert!(debug.contains("binding_count: 0"), "{debug}");
        assert!(debug.contains("k1"), "{debug}");
    }
}
