//! Named property slots.
//!
//! A [`Key`] identifies one property on a bindable object. It carries the
//! name plus a human-readable label for the value type the slot expects; the
//! label is only used in diagnostics.
//!
//! # Invariants
//!
//! 1. **Identity is the name**: two keys with the same name are equal and hash
//!    identically, whatever their `expects` label says.
//! 2. Keys are cheap to clone. Keys declared as `const` borrow their name and
//!    never allocate.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::borrow::Cow;

/// A named, typed property slot.
///
/// ```
/// # use bindery_core::Key;
/// const NAME: Key = Key::typed("name", "text");
///
/// assert_eq!(NAME, Key::new("name"));
/// assert_eq!(NAME.expects(), "text");
/// assert_eq!(NAME.to_string(), "name");
/// ```
#[derive(Clone, Debug)]
pub struct Key {
    name: Cow<'static, str>,
    expects: &'static str,
}

impl Key {
    /// Declare a key whose value type is unspecified.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self::typed(name, "any")
    }

    /// Declare a key and label the value type it expects.
    #[must_use]
    pub const fn typed(name: &'static str, expects: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            expects,
        }
    }

    /// Build a key from a runtime string (e.g. a document field name).
    #[must_use]
    pub fn owned(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            expects: "any",
        }
    }

    /// The key's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label of the value type this key expects.
    #[must_use]
    pub fn expects(&self) -> &'static str {
        self.expects
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_expects_label() {
        assert_eq!(Key::typed("severity", "Severity"), Key::new("severity"));
        assert_ne!(Key::new("severity"), Key::new("name"));
    }

    #[test]
    fn owned_and_borrowed_keys_hash_alike() {
        let mut set = HashSet::new();
        set.insert(Key::new("name"));
        assert!(set.contains(&Key::owned(String::from("name"))));
        assert!(!set.insert(Key::owned("name")));
    }

    #[test]
    fn const_declaration() {
        const SEVERITY: Key = Key::typed("severity", "Severity");
        assert_eq!(SEVERITY.name(), "severity");
        assert_eq!(SEVERITY.expects(), "Severity");
        assert_eq!(Key::new("x").expects(), "any");
    }

    #[test]
    fn display_is_name() {
        assert_eq!(format!("{}", Key::typed("color", "text")), "color");
    }
}
