//! Typed-value coercion registry.
//!
//! Turns an untyped decoded value ([`RawValue`]) into the domain value a key
//! expects, and encodes domain values back into raw trees.
//!
//! # Invariants
//!
//! 1. **Identity without a rule**: a key with no registered rule coerces its
//!    input to itself (wrapped in a [`Value`]), leaving interpretation to the
//!    consumer.
//! 2. **Representation before membership**: a rule checks the raw
//!    representation first (type mismatch), then membership (value not
//!    recognized).
//! 3. **Literal round trip**: for a [`Literal`] enum, coercing
//!    `m.to_raw()` yields `m`, and encoding `m` yields `m.to_raw()`.
//! 4. Rules are plain function pointers; they capture no state.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Wrong representation | e.g. number where text expected | `TypeMismatch` |
//! | Unknown literal | e.g. `"gamma"` for `{alpha, beta}` | `ValueNotRecognized` |
//! | No rule | key not registered | input returned unchanged |
//! | Unencodable value | encoder does not accept the value | `encode` returns `None` |

use std::collections::HashMap;

use crate::error::BindError;
use crate::key::Key;
use crate::value::{RawValue, Value};

/// Name of the representation a raw value uses, for error messages.
#[must_use]
pub fn raw_kind(raw: &RawValue) -> &'static str {
    match raw {
        RawValue::Null => "null",
        RawValue::Bool(_) => "boolean",
        RawValue::Number(_) => "number",
        RawValue::String(_) => "text",
        RawValue::Array(_) => "sequence",
        RawValue::Object(_) => "mapping",
    }
}

// ---------------------------------------------------------------------------
// Literal enums
// ---------------------------------------------------------------------------

/// A domain enum whose members are identified by text literals.
///
/// Usually implemented through [`literal_enum!`](crate::literal_enum).
pub trait Literal: Copy + PartialEq + 'static {
    /// Every member, in declaration order.
    const MEMBERS: &'static [Self];

    /// Label used in type-mismatch errors.
    const TYPE_NAME: &'static str;

    /// The member's text literal.
    fn literal(self) -> &'static str;

    /// The member whose literal is `text`.
    fn from_literal(text: &str) -> Option<Self> {
        Self::MEMBERS.iter().copied().find(|m| m.literal() == text)
    }

    /// Serialized representation: the literal as a raw text value.
    fn to_raw(self) -> RawValue {
        RawValue::String(self.literal().to_owned())
    }
}

/// Declare an enum whose members map one-to-one onto text literals.
///
/// ```
/// use bindery_core::{Literal, literal_enum};
///
/// literal_enum! {
///     /// Greek test letters.
///     pub enum Letter {
///         Alpha => "alpha",
///         Beta => "beta",
///     }
/// }
///
/// assert_eq!(Letter::from_literal("beta"), Some(Letter::Beta));
/// assert_eq!(Letter::Alpha.literal(), "alpha");
/// assert_eq!(Letter::MEMBERS.len(), 2);
/// ```
#[macro_export]
macro_rules! literal_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $lit:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::coerce::Literal for $name {
            const MEMBERS: &'static [Self] = &[$( Self::$variant ),+];
            const TYPE_NAME: &'static str = stringify!($name);

            fn literal(self) -> &'static str {
                match self {
                    $( Self::$variant => $lit ),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::coerce::Literal::literal(*self))
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Produces a domain value for `key` from a raw value.
pub type CoerceFn = fn(&Key, &RawValue) -> Result<Value, BindError>;

/// Encodes a domain value back into a raw value, if it has the right type.
pub type EncodeFn = fn(&Value) -> Option<RawValue>;

/// How one key's raw values become domain values.
#[derive(Clone, Copy)]
pub struct CoercionRule {
    expects: &'static str,
    coerce: CoerceFn,
    encode: EncodeFn,
}

impl CoercionRule {
    /// Build a rule from its parts.
    #[must_use]
    pub const fn new(expects: &'static str, coerce: CoerceFn, encode: EncodeFn) -> Self {
        Self {
            expects,
            coerce,
            encode,
        }
    }

    /// Text literal → `String`.
    #[must_use]
    pub fn text() -> Self {
        Self::new("text", coerce_text, encode_text)
    }

    /// Integral number → `i64`.
    #[must_use]
    pub fn integer() -> Self {
        Self::new("integer", coerce_integer, encode_integer)
    }

    /// Boolean → `bool`.
    #[must_use]
    pub fn boolean() -> Self {
        Self::new("boolean", coerce_boolean, encode_boolean)
    }

    /// Text literal → member of the literal enum `E`.
    #[must_use]
    pub fn literal<E: Literal>() -> Self {
        Self::new(E::TYPE_NAME, coerce_literal::<E>, encode_literal::<E>)
    }

    /// Label of the domain type this rule produces.
    #[must_use]
    pub fn expects(&self) -> &'static str {
        self.expects
    }

    /// Apply the rule.
    pub fn coerce(&self, key: &Key, raw: &RawValue) -> Result<Value, BindError> {
        (self.coerce)(key, raw)
    }

    /// Encode a domain value, if the rule recognizes its type.
    #[must_use]
    pub fn encode(&self, value: &Value) -> Option<RawValue> {
        (self.encode)(value)
    }
}

impl std::fmt::Debug for CoercionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoercionRule")
            .field("expects", &self.expects)
            .finish_non_exhaustive()
    }
}

fn coerce_text(key: &Key, raw: &RawValue) -> Result<Value, BindError> {
    match raw {
        RawValue::String(s) => Ok(Value::new(s.clone())),
        other => Err(BindError::type_mismatch(key, "text", raw_kind(other))),
    }
}

fn encode_text(value: &Value) -> Option<RawValue> {
    value
        .downcast_ref::<String>()
        .map(|s| RawValue::String(s.clone()))
}

fn coerce_integer(key: &Key, raw: &RawValue) -> Result<Value, BindError> {
    match raw {
        RawValue::Number(n) => n
            .as_i64()
            .map(Value::new)
            .ok_or_else(|| BindError::not_recognized(key, n.to_string())),
        other => Err(BindError::type_mismatch(key, "integer", raw_kind(other))),
    }
}

fn encode_integer(value: &Value) -> Option<RawValue> {
    value.downcast_ref::<i64>().map(|n| RawValue::from(*n))
}

fn coerce_boolean(key: &Key, raw: &RawValue) -> Result<Value, BindError> {
    match raw {
        RawValue::Bool(b) => Ok(Value::new(*b)),
        other => Err(BindError::type_mismatch(key, "boolean", raw_kind(other))),
    }
}

fn encode_boolean(value: &Value) -> Option<RawValue> {
    value.downcast_ref::<bool>().map(|b| RawValue::Bool(*b))
}

fn coerce_literal<E: Literal>(key: &Key, raw: &RawValue) -> Result<Value, BindError> {
    let RawValue::String(text) = raw else {
        return Err(BindError::type_mismatch(key, "text", raw_kind(raw)));
    };
    E::from_literal(text)
        .map(Value::new)
        .ok_or_else(|| BindError::not_recognized(key, raw.to_string()))
}

fn encode_literal<E: Literal>(value: &Value) -> Option<RawValue> {
    value.downcast_ref::<E>().map(|m| m.to_raw())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Per-key coercion rules.
///
/// # Example
///
/// ```
/// use bindery_core::{CoercionRegistry, CoercionRule, Key, literal_enum};
/// use serde_json::json;
///
/// literal_enum! {
///     pub enum Letter { Alpha => "alpha", Beta => "beta" }
/// }
///
/// let letter = Key::typed("letter", "Letter");
/// let mut registry = CoercionRegistry::new();
/// registry.register(letter.clone(), CoercionRule::literal::<Letter>());
///
/// let value = registry.coerce(&letter, &json!("alpha")).unwrap();
/// assert_eq!(value.get::<Letter>(), Some(Letter::Alpha));
/// assert_eq!(registry.encode(&letter, &value), Some(json!("alpha")));
///
/// // Unregistered keys pass through untouched.
/// let other = registry.coerce(&Key::new("notes"), &json!([1, 2])).unwrap();
/// assert_eq!(other.as_raw(), Some(&json!([1, 2])));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoercionRegistry {
    rules: HashMap<Key, CoercionRule>,
}

impl CoercionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the rule for `key`.
    ///
    /// Returns the registry for chaining.
    pub fn register(&mut self, key: Key, rule: CoercionRule) -> &mut Self {
        self.rules.insert(key, rule);
        self
    }

    /// The rule registered for `key`.
    #[must_use]
    pub fn rule(&self, key: &Key) -> Option<&CoercionRule> {
        self.rules.get(key)
    }

    /// Whether `key` has a rule.
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.rules.contains_key(key)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Coerce `raw` for `key`; identity when `key` has no rule.
    pub fn coerce(&self, key: &Key, raw: &RawValue) -> Result<Value, BindError> {
        match self.rules.get(key) {
            Some(rule) => rule.coerce(key, raw),
            None => Ok(Value::raw(raw.clone())),
        }
    }

    /// Coerce `value` only if it still wraps a raw tree and `key` has a rule.
    ///
    /// Domain values are returned unchanged.
    pub fn resolve(&self, key: &Key, value: Value) -> Result<Value, BindError> {
        match (value.as_raw(), self.rules.get(key)) {
            (Some(raw), Some(rule)) => rule.coerce(key, raw),
            _ => Ok(value),
        }
    }

    /// Encode a domain value stored under `key` back into a raw tree.
    ///
    /// Raw values pass through; values the key's rule does not recognize
    /// yield `None`.
    #[must_use]
    pub fn encode(&self, key: &Key, value: &Value) -> Option<RawValue> {
        if let Some(raw) = value.as_raw() {
            return Some(raw.clone());
        }
        self.rules.get(key).and_then(|rule| rule.encode(value))
    }
}
