//! Type-erased values carried through bindings.
//!
//! A [`Value`] wraps any `'static` domain value behind an `Rc`, so handing
//! the same value to every downstream binding costs a reference-count bump.
//! Untyped document values ([`RawValue`]) are wrapped the same way; the
//! coercion registry recognizes them and converts them on demand.
//!
//! `Value` is deliberately `!Send`: the engine is single-threaded.

use core::any::{Any, type_name};
use core::fmt;
use std::rc::Rc;

use crate::error::BindError;
use crate::key::Key;

/// Untyped value tree produced by decoding a generic document.
pub type RawValue = serde_json::Value;

/// A cheap-to-clone, type-erased domain value.
#[derive(Clone)]
pub struct Value {
    inner: Rc<dyn Any>,
    type_name: &'static str,
}

impl Value {
    /// Wrap a domain value.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Wrap an untyped document value.
    #[must_use]
    pub fn raw(raw: RawValue) -> Self {
        Self::new(raw)
    }

    /// Full type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the wrapped value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the wrapped value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Clone the wrapped value out as a `T`.
    #[must_use]
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// The wrapped untyped document value, if this still holds one.
    #[must_use]
    pub fn as_raw(&self) -> Option<&RawValue> {
        self.downcast_ref::<RawValue>()
    }

    /// Clone the wrapped value out as a `T`, or report a type mismatch for
    /// `key`.
    ///
    /// This is the usual first line of a `set_own` implementation.
    pub fn cast<T: Any + Clone>(&self, key: &Key, expected: &'static str) -> Result<T, BindError> {
        self.get::<T>()
            .ok_or_else(|| BindError::type_mismatch(key, expected, self.type_name))
    }

    /// Whether both handles point at the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_raw() {
            Some(raw) => f.debug_tuple("Value").field(raw).finish(),
            None => f
                .debug_struct("Value")
                .field("type", &self.type_name)
                .finish_non_exhaustive(),
        }
    }
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        Self::raw(raw)
    }
}
