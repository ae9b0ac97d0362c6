//! Event categories and event types.
//!
//! An [`EventCategory`] groups [`EventType`]s. Typical wiring binds the
//! category's `name` two-way to each type's `category`, and the category's
//! `severity` one-way to each type's `severity`, so renaming or escalating a
//! category reaches every type in it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bindery_core::{BindError, CoercionRegistry, CoercionRule, Key, Value, literal_enum};
use bindery_runtime::{Bindable, BindingCore, DocumentEntity};

literal_enum! {
    /// How loudly an event should be surfaced.
    pub enum Severity {
        Info => "info",
        Warning => "warning",
        Critical => "critical",
    }
}

literal_enum! {
    /// Who may see events of a type.
    pub enum Visibility {
        Public => "public",
        Internal => "internal",
    }
}

/// Keys used by the reference entities.
pub mod keys {
    use bindery_core::Key;

    /// Display name of a category or event type.
    pub const NAME: Key = Key::typed("name", "text");
    /// How loudly events are surfaced.
    pub const SEVERITY: Key = Key::typed("severity", "Severity");
    /// Category highlight color, e.g. `"#ffaa00"`.
    pub const COLOR: Key = Key::typed("color", "text");
    /// Name of the category an event type belongs to.
    pub const CATEGORY: Key = Key::typed("category", "text");
    /// Audience of an event type.
    pub const VISIBILITY: Key = Key::typed("visibility", "Visibility");
    /// Free-form explanation of an event type.
    pub const DESCRIPTION: Key = Key::typed("description", "text");
}

thread_local! {
    static COERCIONS: Rc<CoercionRegistry> = Rc::new(build_coercions());
}

fn build_coercions() -> CoercionRegistry {
    let mut registry = CoercionRegistry::new();
    registry
        .register(keys::NAME, CoercionRule::text())
        .register(keys::SEVERITY, CoercionRule::literal::<Severity>())
        .register(keys::COLOR, CoercionRule::text())
        .register(keys::CATEGORY, CoercionRule::text())
        .register(keys::VISIBILITY, CoercionRule::literal::<Visibility>())
        .register(keys::DESCRIPTION, CoercionRule::text());
    registry
}

/// The coercion rules shared by the reference entities on this thread.
#[must_use]
pub fn coercions() -> Rc<CoercionRegistry> {
    COERCIONS.with(Rc::clone)
}

fn store_text(slot: &RefCell<Option<String>>, value: &Value, key: &Key) -> Result<(), BindError> {
    *slot.borrow_mut() = Some(value.cast(key, "text")?);
    Ok(())
}

fn store_literal<E: bindery_core::Literal>(
    slot: &Cell<Option<E>>,
    value: &Value,
    key: &Key,
) -> Result<(), BindError> {
    slot.set(Some(value.cast(key, E::TYPE_NAME)?));
    Ok(())
}

// ---------------------------------------------------------------------------
// EventCategory
// ---------------------------------------------------------------------------

const CATEGORY_BINDABLE: &[Key] = &[keys::NAME, keys::SEVERITY];
const CATEGORY_FIELDS: &[Key] = &[keys::NAME, keys::SEVERITY, keys::COLOR];

/// A named group of event types.
///
/// Bindable keys: `name`, `severity`. `color` is own state only.
pub struct EventCategory {
    core: BindingCore,
    coercions: Rc<CoercionRegistry>,
    name: RefCell<Option<String>>,
    severity: Cell<Option<Severity>>,
    color: RefCell<Option<String>>,
}

impl EventCategory {
    /// An empty category.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: BindingCore::new(),
            coercions: coercions(),
            name: RefCell::new(None),
            severity: Cell::new(None),
            color: RefCell::new(None),
        }
    }

    /// A category with a name and severity, ready to share.
    #[must_use]
    pub fn shared(name: &str, severity: Severity) -> Rc<Self> {
        let category = Self::new();
        *category.name.borrow_mut() = Some(name.to_owned());
        category.severity.set(Some(severity));
        Rc::new(category)
    }

    /// Display name, if set.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.name.borrow().clone()
    }

    /// Current severity, if set.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.severity.get()
    }

    /// Highlight color, if set.
    #[must_use]
    pub fn color(&self) -> Option<String> {
        self.color.borrow().clone()
    }
}

impl Default for EventCategory {
    fn default() -> Self {
        Self::new()
    }
}

impl Bindable for EventCategory {
    fn binding_core(&self) -> &BindingCore {
        &self.core
    }

    fn bindable_keys(&self) -> &[Key] {
        CATEGORY_BINDABLE
    }

    fn value(&self, key: &Key) -> Option<Value> {
        match key.name() {
            "name" => self.name().map(Value::new),
            "severity" => self.severity().map(Value::new),
            "color" => self.color().map(Value::new),
            _ => None,
        }
    }

    fn set_own(&self, value: Value, key: &Key) -> Result<(), BindError> {
        let value = self.coercions.resolve(key, value)?;
        match key.name() {
            "name" => store_text(&self.name, &value, key),
            "severity" => store_literal(&self.severity, &value, key),
            "color" => store_text(&self.color, &value, key),
            _ => Err(BindError::invalid_key(key)),
        }
    }
}

impl DocumentEntity for EventCategory {
    const ENTITY: &'static str = "EventCategory";

    fn document_fields(&self) -> &[Key] {
        CATEGORY_FIELDS
    }

    fn coercions(&self) -> &CoercionRegistry {
        &self.coercions
    }
}

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

const TYPE_BINDABLE: &[Key] = &[keys::CATEGORY, keys::SEVERITY, keys::VISIBILITY];
const TYPE_FIELDS: &[Key] = &[
    keys::NAME,
    keys::CATEGORY,
    keys::SEVERITY,
    keys::VISIBILITY,
    keys::DESCRIPTION,
];

/// One kind of event, belonging to a category.
///
/// Bindable keys: `category`, `severity`, `visibility`. `name` and
/// `description` are own state only.
pub struct EventType {
    core: BindingCore,
    coercions: Rc<CoercionRegistry>,
    name: RefCell<Option<String>>,
    category: RefCell<Option<String>>,
    severity: Cell<Option<Severity>>,
    visibility: Cell<Option<Visibility>>,
    description: RefCell<Option<String>>,
}

impl EventType {
    /// An empty event type.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: BindingCore::new(),
            coercions: coercions(),
            name: RefCell::new(None),
            category: RefCell::new(None),
            severity: Cell::new(None),
            visibility: Cell::new(None),
            description: RefCell::new(None),
        }
    }

    /// A named event type, ready to share.
    #[must_use]
    pub fn shared(name: &str) -> Rc<Self> {
        let event_type = Self::new();
        *event_type.name.borrow_mut() = Some(name.to_owned());
        Rc::new(event_type)
    }

    /// Display name, if set.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.name.borrow().clone()
    }

    /// Owning category name, if set.
    #[must_use]
    pub fn category(&self) -> Option<String> {
        self.category.borrow().clone()
    }

    /// Current severity, if set.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.severity.get()
    }

    /// Current visibility, if set.
    #[must_use]
    pub fn visibility(&self) -> Option<Visibility> {
        self.visibility.get()
    }

    /// Description text, if set.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.description.borrow().clone()
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::new()
    }
}

impl Bindable for EventType {
    fn binding_core(&self) -> &BindingCore {
        &self.core
    }

    fn bindable_keys(&self) -> &[Key] {
        TYPE_BINDABLE
    }

    fn value(&self, key: &Key) -> Option<Value> {
        match key.name() {
            "name" => self.name().map(Value::new),
            "category" => self.category().map(Value::new),
            "severity" => self.severity().map(Value::new),
            "visibility" => self.visibility().map(Value::new),
            "description" => self.description().map(Value::new),
            _ => None,
        }
    }

    fn set_own(&self, value: Value, key: &Key) -> Result<(), BindError> {
        let value = self.coercions.resolve(key, value)?;
        match key.name() {
            "name" => store_text(&self.name, &value, key),
            "category" => store_text(&self.category, &value, key),
            "severity" => store_literal(&self.severity, &value, key),
            "visibility" => store_literal(&self.visibility, &value, key),
            "description" => store_text(&self.description, &value, key),
            _ => Err(BindError::invalid_key(key)),
        }
    }
}

impl DocumentEntity for EventType {
    const ENTITY: &'static str = "EventType";

    fn document_fields(&self) -> &[Key] {
        TYPE_FIELDS
    }

    fn coercions(&self) -> &CoercionRegistry {
        &self.coercions
    }
}
