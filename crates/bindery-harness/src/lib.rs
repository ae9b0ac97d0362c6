#![forbid(unsafe_code)]

//! Reference fixtures for Bindery.
//!
//! [`model`] holds two small entities, [`EventCategory`] and [`EventType`],
//! written the way an application would write them: plain `Cell`/`RefCell`
//! fields, a fixed set of bindable keys, and coercion rules shared through a
//! thread-local registry. Integration tests and benchmarks build on them.

pub mod model;

pub use model::{EventCategory, EventType, Severity, Visibility, coercions, keys};

/// Install a `tracing` subscriber for the current test, honoring `RUST_LOG`.
///
/// Safe to call more than once.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
