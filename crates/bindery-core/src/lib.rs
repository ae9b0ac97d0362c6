#![forbid(unsafe_code)]

//! Leaf types shared by every Bindery crate.
//!
//! - [`Key`]: a named, typed property slot on a bindable object.
//! - [`Value`]: a type-erased, cheap-to-clone domain value that flows through
//!   bindings.
//! - [`coerce`]: the registry that turns untyped document values
//!   ([`RawValue`]) into domain values, and back.
//! - [`BindError`]: every failure the engine can report.

pub mod coerce;
pub mod error;
pub mod key;
pub mod value;

pub use coerce::{CoercionRegistry, CoercionRule, Literal, raw_kind};
pub use error::BindError;
pub use key::Key;
pub use value::{RawValue, Value};
