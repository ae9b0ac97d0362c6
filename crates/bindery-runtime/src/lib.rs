#![forbid(unsafe_code)]

//! Binding engine for Bindery.
//!
//! Objects implement [`Bindable`] by exposing their key lookup, their own
//! storage, and a [`BindingCore`]. Everything else (guarded sets, fan-out,
//! two-way and one-way links) is provided on top of those four methods.
//!
//! ```
//! use std::rc::Rc;
//! use bindery_runtime::{Bindable, BindableExt, Key, Record, Value};
//!
//! const TITLE: Key = Key::typed("title", "text");
//!
//! let a = Rc::new(Record::new([TITLE]));
//! let b = Rc::new(Record::new([TITLE]));
//! a.set(Value::new(String::from("draft")), &TITLE).unwrap();
//!
//! a.bind(&TITLE, &b, &TITLE).unwrap();
//! assert_eq!(b.get::<String>(&TITLE).as_deref(), Some("draft"));
//!
//! b.set(Value::new(String::from("final")), &TITLE).unwrap();
//! assert_eq!(a.get::<String>(&TITLE).as_deref(), Some("final"));
//! ```

pub mod binding;
pub mod config;
pub mod document;
pub mod policy;
pub mod record;

pub use bindery_core::{
    BindError, CoercionRegistry, CoercionRule, Key, Literal, RawValue, Value, literal_enum,
};
pub use binding::{
    Bindable, BindableExt, BindingAction, BindingCore, KeyGuard, LinkScope, ObjectId, Registered,
};
pub use config::{EngineConfig, ErrorPolicyKind};
pub use document::{DocumentEntity, populate, snapshot};
pub use policy::{BindFailure, ErrorPolicy};
pub use record::Record;
