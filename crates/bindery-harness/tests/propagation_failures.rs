//! Failures raised deep inside a fan-out.

use std::cell::RefCell;
use std::rc::Rc;

use bindery_harness::{EventCategory, EventType, Severity, init_test_logging, keys};
use bindery_runtime::{
    BindError, Bindable, BindableExt, ErrorPolicy, Key, Record, Value,
};
use serde_json::json;

#[test]
fn downstream_rejection_reaches_the_setter() {
    init_test_logging();
    let source = Rc::new(Record::new([keys::SEVERITY]));
    let event_type = EventType::shared("queue.stalled");
    source
        .bind_one_way(&keys::SEVERITY, &event_type, &keys::SEVERITY)
        .unwrap();

    let err = source
        .set(Value::raw(json!("catastrophic")), &keys::SEVERITY)
        .unwrap_err();

    assert_eq!(
        err,
        BindError::Propagation {
            key: "severity".into(),
            target_key: "severity".into(),
            cause: Box::new(BindError::ValueNotRecognized {
                key: "severity".into(),
                value: "\"catastrophic\"".into(),
            }),
        }
    );
    assert!(source.contains(&keys::SEVERITY), "source kept its value");
    assert_eq!(event_type.severity(), None);
    assert!(source.binding_core().keys_being_set().is_empty());
    assert!(event_type.binding_core().keys_being_set().is_empty());
}

#[test]
fn failed_store_skips_fan_out() {
    let category = EventCategory::shared("Queues", Severity::Info);
    let event_type = EventType::shared("queue.stalled");
    category
        .bind_one_way(&keys::SEVERITY, &event_type, &keys::SEVERITY)
        .unwrap();

    let err = category
        .set(Value::new(String::from("loud")), &keys::SEVERITY)
        .unwrap_err();
    assert!(matches!(err, BindError::TypeMismatch { .. }));
    assert_eq!(category.severity(), Some(Severity::Info));
    assert_eq!(event_type.severity(), Some(Severity::Info));
    assert!(category.binding_core().keys_being_set().is_empty());
}

#[test]
fn first_failing_target_stops_fan_out() {
    const LEVEL: Key = Key::typed("severity", "Severity");
    let source = Rc::new(Record::new([LEVEL]));
    let loose = Rc::new(Record::new([LEVEL]));
    let strict = EventType::shared("strict");
    let after = Rc::new(Record::new([LEVEL]));
    source.bind_one_way(&LEVEL, &loose, &LEVEL).unwrap();
    source.bind_one_way(&LEVEL, &strict, &LEVEL).unwrap();
    source.bind_one_way(&LEVEL, &after, &LEVEL).unwrap();

    assert!(source.set(Value::new(42_i64), &LEVEL).is_err());
    assert_eq!(loose.get::<i64>(&LEVEL), Some(42));
    assert_eq!(after.get::<i64>(&LEVEL), None);
}

#[test]
fn deep_failure_keeps_innermost_hop() {
    let head = Rc::new(Record::new([keys::NAME]));
    let middle = Rc::new(Record::new([keys::NAME]));
    let tail = EventType::shared("tail");
    head.bind_one_way(&keys::NAME, &middle, &keys::NAME).unwrap();
    middle
        .bind_one_way(&keys::NAME, &tail, &keys::CATEGORY)
        .unwrap();

    let err = head.set(Value::new(7_i64), &keys::NAME).unwrap_err();
    match &err {
        BindError::Propagation {
            key, target_key, ..
        } => {
            assert_eq!(key, "name");
            assert_eq!(target_key, "category");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(middle.get::<i64>(&keys::NAME), Some(7));
}

#[test]
fn try_set_routes_failures_to_policy() {
    let source = Rc::new(Record::new([keys::SEVERITY]));
    let event_type = EventType::shared("cache.miss");
    source
        .bind_one_way(&keys::SEVERITY, &event_type, &keys::SEVERITY)
        .unwrap();

    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&failures);
    source
        .binding_core()
        .set_error_policy(ErrorPolicy::custom(move |failure| {
            sink.borrow_mut().push(failure.to_string());
        }));

    source.try_set_bound_value(Value::raw(json!(3)), &keys::SEVERITY);
    source.try_set_bound_value(Value::raw(json!("warning")), &keys::SEVERITY);

    assert_eq!(failures.borrow().len(), 1);
    assert!(failures.borrow()[0].contains("expected text, found number"));
    assert_eq!(event_type.severity(), Some(Severity::Warning));
}

#[test]
#[should_panic(expected = "unrecoverable binding failure")]
fn try_set_is_fatal_by_default() {
    let category = EventCategory::shared("Cache", Severity::Info);
    category.try_set_bound_value(Value::new(0.5_f64), &keys::SEVERITY);
}
