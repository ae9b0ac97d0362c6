//! Constructing entities from generic documents.

use bindery_harness::{EventCategory, EventType, Severity, Visibility, coercions, keys};
use bindery_runtime::{BindError, BindableExt, DocumentEntity, Literal};
use serde_json::json;
use std::rc::Rc;

#[test]
fn event_type_from_document() {
    let doc = json!({
        "name": "deploy.failed",
        "category": "Deploys",
        "severity": "critical",
        "visibility": "internal",
        "description": "A deployment did not finish.",
        "owner": "ignored"
    });
    let event_type = EventType::from_document(&doc).unwrap();
    assert_eq!(event_type.name().as_deref(), Some("deploy.failed"));
    assert_eq!(event_type.category().as_deref(), Some("Deploys"));
    assert_eq!(event_type.severity(), Some(Severity::Critical));
    assert_eq!(event_type.visibility(), Some(Visibility::Internal));
    assert_eq!(
        event_type.description().as_deref(),
        Some("A deployment did not finish.")
    );
}

#[test]
fn document_round_trip() {
    let doc = json!({"name": "Billing", "severity": "warning", "color": "#ffaa00"});
    let category = EventCategory::from_document(&doc).unwrap();
    assert_eq!(category.to_document(), doc);
}

#[test]
fn partial_document_leaves_fields_unset() {
    let category = EventCategory::from_document(&json!({"name": "Auth"})).unwrap();
    assert_eq!(category.severity(), None);
    assert_eq!(category.to_document(), json!({"name": "Auth"}));
}

#[test]
fn unknown_enum_literal_aborts_construction() {
    let err = EventCategory::from_document(&json!({"name": "Auth", "severity": "fatal"}))
        .err()
        .expect("construction must fail");
    assert_eq!(
        err,
        BindError::decode(
            "EventCategory",
            BindError::ValueNotRecognized {
                key: "severity".into(),
                value: "\"fatal\"".into(),
            }
        )
    );
}

#[test]
fn wrong_representation_aborts_construction() {
    let err = EventType::from_document(&json!({"visibility": 1}))
        .err()
        .expect("construction must fail");
    assert!(matches!(
        err.root_cause(),
        BindError::TypeMismatch { expected: "text", .. }
    ));
}

#[test]
fn non_mapping_document_is_rejected() {
    let err = EventType::from_document(&json!("deploy.failed"))
        .err()
        .expect("construction must fail");
    assert!(err.to_string().starts_with("cannot decode EventType"), "{err}");
}

#[test]
fn decoded_entities_bind_like_any_other() {
    let category = Rc::new(
        EventCategory::from_document(&json!({"name": "Payments", "severity": "info"})).unwrap(),
    );
    let event_type = Rc::new(EventType::from_document(&json!({"name": "charge.failed"})).unwrap());

    category
        .bind(&keys::SEVERITY, &event_type, &keys::SEVERITY)
        .unwrap();
    assert_eq!(event_type.severity(), Some(Severity::Info));
    assert_eq!(event_type.to_document()["severity"], json!("info"));
}

#[test]
fn coercion_round_trip_for_every_member() {
    let registry = coercions();
    for member in Severity::MEMBERS {
        let value = registry.coerce(&keys::SEVERITY, &member.to_raw()).unwrap();
        assert_eq!(value.get::<Severity>(), Some(*member));
        assert_eq!(registry.encode(&keys::SEVERITY, &value), Some(member.to_raw()));
    }
}
