//! What happens to bound-value failures nobody can return to.
//!
//! [`Bindable::try_set_bound_value`](crate::Bindable::try_set_bound_value)
//! never returns an error. A failure there means a source already committed a
//! value its target could not accept, so the pair is out of sync; the
//! object's [`ErrorPolicy`] decides how loudly that is reported.
//!
//! # Failure Modes
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | `Fatal` (default) | panics with the failure |
//! | `Log` | `tracing::error!` and continue |
//! | `Custom` | the callback receives the [`BindFailure`] |

use std::fmt;
use std::rc::Rc;

use bindery_core::{BindError, Key, Value};

use crate::config::ErrorPolicyKind;

/// A bound value that could not be propagated.
#[derive(Clone, Debug)]
pub struct BindFailure {
    /// Why the set failed.
    pub error: BindError,
    /// The offending value.
    pub value: Value,
    /// Key the value was set for.
    pub key: Key,
}

impl fmt::Display for BindFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bound value of type {} for '{}' rejected: {}",
            self.value.type_name(),
            self.key,
            self.error
        )
    }
}

/// Handler for failures surfaced by `try_set_bound_value`.
#[derive(Clone, Default)]
pub enum ErrorPolicy {
    /// Treat the failure as unrecoverable.
    #[default]
    Fatal,
    /// Log the failure and carry on.
    Log,
    /// Hand the failure to a callback.
    Custom(Rc<dyn Fn(&BindFailure)>),
}

impl ErrorPolicy {
    /// Policy that forwards failures to `handler`.
    pub fn custom(handler: impl Fn(&BindFailure) + 'static) -> Self {
        Self::Custom(Rc::new(handler))
    }

    /// Apply the policy to `failure`.
    ///
    /// # Panics
    ///
    /// Panics under [`ErrorPolicy::Fatal`].
    pub fn handle(&self, failure: BindFailure) {
        match self {
            Self::Fatal => panic!("unrecoverable binding failure: {failure}"),
            Self::Log => tracing::error!(
                key = %failure.key,
                value = failure.value.type_name(),
                error = %failure.error,
                "bound value could not be propagated"
            ),
            Self::Custom(handler) => handler(&failure),
        }
    }
}

impl From<ErrorPolicyKind> for ErrorPolicy {
    fn from(kind: ErrorPolicyKind) -> Self {
        match kind {
            ErrorPolicyKind::Fatal => Self::Fatal,
            ErrorPolicyKind::Log => Self::Log,
        }
    }
}

impl fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => f.write_str("Fatal"),
            Self::Log => f.write_str("Log"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
