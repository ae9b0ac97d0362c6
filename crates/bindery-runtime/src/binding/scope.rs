//! Lifecycle management for groups of links.

use std::fmt;
use std::rc::{Rc, Weak};

use bindery_core::{BindError, Key};

use super::action::downgrade;
use super::bindable::Bindable;
use super::link::{BindableExt, Registered};
use super::state::ObjectId;

struct Link {
    source: Weak<dyn Bindable>,
    source_id: ObjectId,
    key: Key,
    target: Weak<dyn Bindable>,
    target_id: ObjectId,
    target_key: Key,
    added: Registered,
}

impl Link {
    /// Remove exactly the actions this scope added.
    fn sever(&self) {
        if self.added.forward {
            if let Some(source) = self.source.upgrade() {
                source
                    .binding_core()
                    .remove_last(&self.key, self.target_id, &self.target_key);
            }
        }
        if self.added.reverse {
            if let Some(target) = self.target.upgrade() {
                target
                    .binding_core()
                    .remove_last(&self.target_key, self.source_id, &self.key);
            }
        }
    }
}

/// Owns the links created through it and unbinds them when dropped.
///
/// Links are created with the same semantics as [`BindableExt::bind`] and
/// [`BindableExt::bind_one_way`].
///
/// # Usage
///
/// ```
/// use std::rc::Rc;
/// use bindery_runtime::{Bindable, Key, LinkScope, Record, Value};
///
/// const TITLE: Key = Key::new("title");
/// let a = Rc::new(Record::new([TITLE]));
/// let b = Rc::new(Record::new([TITLE]));
///
/// {
///     let mut scope = LinkScope::new();
///     scope.bind(&a, &TITLE, &b, &TITLE).unwrap();
///     a.set(Value::new(1_i64), &TITLE).unwrap();
///     assert_eq!(b.get::<i64>(&TITLE), Some(1));
/// }
///
/// // Scope dropped: the link is gone.
/// a.set(Value::new(2_i64), &TITLE).unwrap();
/// assert_eq!(b.get::<i64>(&TITLE), Some(1));
/// ```
///
/// # Invariants
///
/// 1. Links are severed in reverse creation order on drop or `clear()`.
/// 2. After severing, no value flows through any link of this scope.
/// 3. A link that failed to bind is not recorded, and neither is one that
///    added nothing because an identical link already existed.
/// 4. Severing a link whose endpoint was already dropped still removes the
///    surviving side's action.
/// 5. Severing removes only the actions the scope added, never an identical
///    link created outside it.
#[derive(Default)]
pub struct LinkScope {
    links: Vec<Link>,
}

impl LinkScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a two-way link owned by this scope.
    ///
    /// Returns the scope for chaining.
    pub fn bind<S, T>(
        &mut self,
        source: &Rc<S>,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
    ) -> Result<&mut Self, BindError>
    where
        S: Bindable + 'static,
        T: Bindable + 'static,
    {
        let added = source.bind(key, target, target_key)?;
        self.record(source, key, target, target_key, added);
        Ok(self)
    }

    /// Create a one-way link owned by this scope.
    pub fn bind_one_way<S, T>(
        &mut self,
        source: &Rc<S>,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
    ) -> Result<&mut Self, BindError>
    where
        S: Bindable + 'static,
        T: Bindable + 'static,
    {
        let added = source.bind_one_way(key, target, target_key)?;
        self.record(source, key, target, target_key, added);
        Ok(self)
    }

    /// Number of links owned by this scope.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether the scope owns no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Sever every link now; the scope stays usable.
    pub fn clear(&mut self) {
        while let Some(link) = self.links.pop() {
            link.sever();
        }
    }

    fn record<S, T>(
        &mut self,
        source: &Rc<S>,
        key: &Key,
        target: &Rc<T>,
        target_key: &Key,
        added: Registered,
    ) where
        S: Bindable + 'static,
        T: Bindable + 'static,
    {
        if !added.any() {
            return;
        }
        self.links.push(Link {
            source: downgrade(source),
            source_id: source.binding_core().id(),
            key: key.clone(),
            target: downgrade(target),
            target_id: target.binding_core().id(),
            target_key: target_key.clone(),
            added,
        });
    }
}

impl Drop for LinkScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for LinkScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkScope")
            .field("link_count", &self.links.len())
            .finish()
    }
}
