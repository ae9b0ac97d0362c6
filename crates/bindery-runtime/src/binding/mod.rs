#![forbid(unsafe_code)]

//! Key bindings between bindable objects.
//!
//! - [`Bindable`]: the capability an object implements to take part in
//!   bindings (key lookup, own storage, guarded set and fan-out).
//! - [`BindingCore`]: per-object engine state: the action table and the
//!   reentrancy guard.
//! - [`BindingAction`]: one registered downstream `(target, key)` pair.
//! - [`BindableExt`]: `bind` / `bind_one_way` / `unbind` / `unbind_one_way`
//!   on `Rc`-shared objects.
//! - [`LinkScope`]: RAII owner of a group of links.
//!
//! # Architecture
//!
//! Objects are shared as `Rc<T>` and mutate through `&self`, since a set on
//! one object can re-enter it through a binding cycle. Actions hold their
//! target as `Weak<dyn Bindable>`; targets dropped while still bound are
//! skipped and pruned lazily during fan-out.
//!
//! # Invariants
//!
//! 1. Only declared bindable keys fan out. Other keys are plain own state.
//! 2. A key that is already being set on an object is never re-entered on
//!    that object; the nested set is a silent no-op.
//! 3. Each guard entry is released by the call that pushed it, on success and
//!    on failure, so the guard is empty once the outermost set returns.
//! 4. Downstream actions for one key fire in registration order.
//! 5. Storage happens before fan-out; a failed store skips fan-out.
//! 6. Unbinding a link that does not exist is a no-op.

mod action;
mod bindable;
mod link;
mod scope;
mod state;

pub use action::BindingAction;
pub use bindable::Bindable;
pub use link::{BindableExt, Registered};
pub use scope::LinkScope;
pub use state::{BindingCore, KeyGuard, ObjectId};
