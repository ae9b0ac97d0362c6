//! Engine configuration.
//!
//! Each [`BindingCore`](crate::BindingCore) is created from an
//! [`EngineConfig`]. `BindingCore::new()` uses the thread's current config,
//! which starts out as [`EngineConfig::from_env`] and can be replaced with
//! [`EngineConfig::install`].
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `BINDERY_ERROR_POLICY` | `fatal`, `log` | `fatal` |
//! | `BINDERY_DEDUPE_LINKS` | `1`/`true`/`yes`/`on`, `0`/`false`/`no`/`off` | `true` |
//!
//! Unrecognized values fall back to the default.

use std::cell::RefCell;
use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable selecting the default error policy.
pub const ERROR_POLICY_VAR: &str = "BINDERY_ERROR_POLICY";
/// Environment variable toggling link deduplication.
pub const DEDUPE_LINKS_VAR: &str = "BINDERY_DEDUPE_LINKS";

thread_local! {
    static CURRENT: RefCell<EngineConfig> = RefCell::new(EngineConfig::from_env());
}

/// Serializable selector for [`ErrorPolicy`](crate::ErrorPolicy).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicyKind {
    /// Panic on failures reported through `try_set_bound_value`.
    #[default]
    Fatal,
    /// Log them and continue.
    Log,
}

impl FromStr for ErrorPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fatal" => Ok(Self::Fatal),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown error policy: {other}")),
        }
    }
}

/// Settings applied to newly created binding cores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Policy for failures reported through `try_set_bound_value`.
    pub error_policy: ErrorPolicyKind,
    /// Skip registering a link that already exists.
    pub dedupe_links: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicyKind::Fatal,
            dedupe_links: true,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let policy = env::var(ERROR_POLICY_VAR).ok();
        let dedupe = env::var(DEDUPE_LINKS_VAR).ok();
        Self::from_vars(policy.as_deref(), dedupe.as_deref())
    }

    /// Build a configuration from raw variable values.
    #[must_use]
    pub fn from_vars(error_policy: Option<&str>, dedupe_links: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            error_policy: error_policy
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.error_policy),
            dedupe_links: dedupe_links
                .and_then(parse_flag)
                .unwrap_or(defaults.dedupe_links),
        }
    }

    /// The configuration new cores on this thread are created with.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Make this the configuration for cores created later on this thread.
    pub fn install(self) {
        CURRENT.with(|current| *current.borrow_mut() = self);
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Bindable, BindableExt, BindingCore};
    use crate::policy::ErrorPolicy;
    use crate::record::Record;
    use bindery_core::{Key, Value};
    use std::rc::Rc;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.error_policy, ErrorPolicyKind::Fatal);
        assert!(config.dedupe_links);
    }

    #[test]
    fn from_vars_parses_known_values() {
        let config = EngineConfig::from_vars(Some(" LOG "), Some("off"));
        assert_eq!(config.error_policy, ErrorPolicyKind::Log);
        assert!(!config.dedupe_links);
    }

    #[test]
    fn from_vars_falls_back_on_garbage() {
        let config = EngineConfig::from_vars(Some("explode"), Some("maybe"));
        assert_eq!(config, EngineConfig::default());
        assert_eq!(EngineConfig::from_vars(None, None), EngineConfig::default());
    }

    #[test]
    fn from_json_with_partial_document() {
        let config = EngineConfig::from_json(r#"{"error_policy":"log"}"#).unwrap();
        assert_eq!(config.error_policy, ErrorPolicyKind::Log);
        assert!(config.dedupe_links);
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        assert!(EngineConfig::from_json(r#"{"batching":true}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"error_policy":"retry"}"#).is_err());
    }

    #[test]
    fn policy_kind_from_str() {
        assert_eq!("Fatal".parse::<ErrorPolicyKind>(), Ok(ErrorPolicyKind::Fatal));
        assert!("retry".parse::<ErrorPolicyKind>().is_err());
    }

    #[test]
    fn installed_config_applies_to_new_cores() {
        let previous = EngineConfig::current();
        EngineConfig {
            error_policy: ErrorPolicyKind::Log,
            dedupe_links: false,
        }
        .install();

        let core = BindingCore::new();
        assert!(matches!(core.error_policy(), ErrorPolicy::Log));

        const K: Key = Key::new("k");
        let a = Rc::new(Record::new([K]));
        let b = Rc::new(Record::new([K]));
        a.bind_one_way(&K, &b, &K).unwrap();
        a.bind_one_way(&K, &b, &K).unwrap();
        assert_eq!(a.binding_core().binding_count(&K), 2);
        a.set(Value::new(1_i64), &K).unwrap();
        assert_eq!(b.get::<i64>(&K), Some(1));

        previous.install();
    }
}
