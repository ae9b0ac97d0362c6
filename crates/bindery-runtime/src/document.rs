//! Building entities from generic documents, and back.
//!
//! A document is a [`RawValue`] mapping from field name to untyped value.
//! Construction coerces each declared field through a [`CoercionRegistry`]
//! and stores it with `set_own`; no binding fires while an entity is being
//! built.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Document is not a mapping | `TypeMismatch` for the entity |
//! | Field coercion fails | construction aborted, error returned |
//! | Field absent or `null` | field skipped, keeps its default |
//! | Undeclared field in document | ignored |

use bindery_core::{BindError, CoercionRegistry, Key, RawValue, raw_kind};

use crate::binding::Bindable;

/// An entity that can be built from, and written back to, a document.
pub trait DocumentEntity: Bindable {
    /// Entity name used in decode errors.
    const ENTITY: &'static str;

    /// Fields read from and written to documents, in order.
    fn document_fields(&self) -> &[Key];

    /// Coercion rules for the document fields.
    fn coercions(&self) -> &CoercionRegistry;

    /// Build a default entity and populate it from `document`.
    ///
    /// Any failure aborts construction and is returned as
    /// [`BindError::Decode`] carrying the originating error.
    fn from_document(document: &RawValue) -> Result<Self, BindError>
    where
        Self: Default + Sized,
    {
        let entity = Self::default();
        populate(
            &entity,
            entity.document_fields(),
            entity.coercions(),
            document,
        )
        .map_err(|cause| BindError::decode(Self::ENTITY, cause))?;
        Ok(entity)
    }

    /// Encode every document field that currently holds a value.
    fn to_document(&self) -> RawValue {
        snapshot(self, self.document_fields(), self.coercions())
    }
}

/// Coerce and store each of `fields` found in `document`.
pub fn populate<B: Bindable + ?Sized>(
    entity: &B,
    fields: &[Key],
    registry: &CoercionRegistry,
    document: &RawValue,
) -> Result<(), BindError> {
    let RawValue::Object(map) = document else {
        return Err(BindError::TypeMismatch {
            key: String::from("<document>"),
            expected: "mapping",
            found: raw_kind(document).to_owned(),
        });
    };

    for field in fields {
        let Some(raw) = map.get(field.name()).filter(|raw| !raw.is_null()) else {
            continue;
        };
        let value = registry.coerce(field, raw)?;
        entity.set_own(value, field)?;
    }
    Ok(())
}

/// Encode `fields` of `entity` into a document mapping.
///
/// Fields without a value, or whose value the registry cannot encode, are
/// left out.
pub fn snapshot<B: Bindable + ?Sized>(
    entity: &B,
    fields: &[Key],
    registry: &CoercionRegistry,
) -> RawValue {
    let map = fields
        .iter()
        .filter_map(|field| {
            let value = entity.value(field)?;
            let raw = registry.encode(field, &value)?;
            Some((field.name().to_owned(), raw))
        })
        .collect();
    RawValue::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use bindery_core::{CoercionRule, Value};
    use serde_json::json;

    const TITLE: Key = Key::typed("title", "text");
    const COUNT: Key = Key::typed("count", "integer");
    const FIELDS: &[Key] = &[TITLE, COUNT];

    fn registry() -> CoercionRegistry {
        let mut registry = CoercionRegistry::new();
        registry
            .register(TITLE, CoercionRule::text())
            .register(COUNT, CoercionRule::integer());
        registry
    }

    #[test]
    fn populate_coerces_declared_fields() {
        let rec = Record::new([TITLE]);
        let doc = json!({"title": "Weekly", "count": 3, "extra": "ignored"});
        populate(&rec, FIELDS, &registry(), &doc).unwrap();
        assert_eq!(rec.get::<String>(&TITLE).as_deref(), Some("Weekly"));
        assert_eq!(rec.get::<i64>(&COUNT), Some(3));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn populate_skips_absent_and_null() {
        let rec = Record::new([TITLE]);
        populate(&rec, FIELDS, &registry(), &json!({"count": null})).unwrap();
        assert!(rec.is_empty());
    }

    #[test]
    fn populate_rejects_non_mapping() {
        let rec = Record::new([TITLE]);
        let err = populate(&rec, FIELDS, &registry(), &json!(["title"])).unwrap_err();
        assert_eq!(
            err,
            BindError::TypeMismatch {
                key: "<document>".into(),
                expected: "mapping",
                found: "sequence".into(),
            }
        );
    }

    #[test]
    fn populate_stops_at_first_bad_field() {
        let rec = Record::new([TITLE]);
        let err = populate(
            &rec,
            FIELDS,
            &registry(),
            &json!({"title": "ok", "count": "three"}),
        )
        .unwrap_err();
        assert_eq!(err, BindError::type_mismatch(&COUNT, "integer", "text"));
        assert_eq!(rec.get::<String>(&TITLE).as_deref(), Some("ok"));
    }

    #[test]
    fn snapshot_encodes_known_values() {
        let rec = Record::new([TITLE]);
        rec.set(Value::new(String::from("Weekly")), &TITLE).unwrap();
        rec.set(Value::new(7_i64), &COUNT).unwrap();
        assert_eq!(
            snapshot(&rec, FIELDS, &registry()),
            json!({"title": "Weekly", "count": 7})
        );
    }

    #[test]
    fn snapshot_skips_unencodable_values() {
        let rec = Record::new([TITLE]);
        rec.set(Value::new(1.5_f64), &TITLE).unwrap();
        assert_eq!(snapshot(&rec, FIELDS, &registry()), json!({}));
    }
}
