//! Engine error kinds.
//!
//! # Failure Modes
//!
//! | Kind | Raised by | Surfaced to |
//! |------|-----------|-------------|
//! | `InvalidKey` | `bind`, `bind_one_way`, `set_own` on an unknown key | immediate caller |
//! | `TypeMismatch` | coercion, `set_own` validation | immediate caller, or wrapped in `Propagation` |
//! | `ValueNotRecognized` | coercion of an unknown enum literal | immediate caller, or wrapped in `Propagation` |
//! | `Propagation` | a downstream target rejected a value during fan-out | the call that started the fan-out |
//! | `Decode` | a document field failed to coerce during construction | the constructor's caller |

use thiserror::Error;

use crate::key::Key;

/// Every failure the binding engine and the coercion layer report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A key outside the declared set for the operation.
    #[error("invalid key '{key}'")]
    InvalidKey { key: String },

    /// The value's underlying representation is not what the key expects.
    #[error("type mismatch for '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },

    /// Right representation, but no domain member matches it.
    #[error("value {value} not recognized for '{key}'")]
    ValueNotRecognized { key: String, value: String },

    /// A downstream target rejected a value its source already committed.
    #[error("propagation from '{key}' to '{target_key}' failed: {cause}")]
    Propagation {
        key: String,
        target_key: String,
        #[source]
        cause: Box<BindError>,
    },

    /// Constructing an entity from a document was aborted.
    #[error("cannot decode {entity}: {cause}")]
    Decode {
        entity: &'static str,
        #[source]
        cause: Box<BindError>,
    },
}

impl BindError {
    /// Invalid-key error for `key`.
    #[must_use]
    pub fn invalid_key(key: &Key) -> Self {
        Self::InvalidKey {
            key: key.name().to_owned(),
        }
    }

    /// Type-mismatch error for `key`.
    #[must_use]
    pub fn type_mismatch(key: &Key, expected: &'static str, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            key: key.name().to_owned(),
            expected,
            found: found.into(),
        }
    }

    /// Value-not-recognized error for `key`.
    #[must_use]
    pub fn not_recognized(key: &Key, value: impl Into<String>) -> Self {
        Self::ValueNotRecognized {
            key: key.name().to_owned(),
            value: value.into(),
        }
    }

    /// Wrap a failure raised while fanning `key` out to `target_key`.
    ///
    /// A failure that is already a propagation failure is kept as is, so the
    /// reported hop is the one closest to the rejecting target.
    #[must_use]
    pub fn propagation(key: &Key, target_key: &Key, cause: BindError) -> Self {
        match cause {
            already @ Self::Propagation { .. } => already,
            cause => Self::Propagation {
                key: key.name().to_owned(),
                target_key: target_key.name().to_owned(),
                cause: Box::new(cause),
            },
        }
    }

    /// Attach a construction failure to `entity`.
    #[must_use]
    pub fn decode(entity: &'static str, cause: BindError) -> Self {
        Self::Decode {
            entity,
            cause: Box::new(cause),
        }
    }

    /// The innermost error, following `Propagation` and `Decode` causes.
    #[must_use]
    pub fn root_cause(&self) -> &BindError {
        match self {
            Self::Propagation { cause, .. } | Self::Decode { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}
