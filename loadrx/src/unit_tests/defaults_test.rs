use crate::{resolve_default, DefaultSource};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_declared_default_wins() {
    let declared = json!("D");
    let array = json!("A");
    let key = DefaultSource::Value(json!("K"));
    assert_eq!(
        resolve_default(Some(&declared), Some(&array), Some(&key)),
        json!("D")
    );
}

#[test]
fn test_precedence_chain() {
    let array = json!("A");
    let key = DefaultSource::Value(json!("K"));
    assert_eq!(resolve_default(None, Some(&array), Some(&key)), json!("A"));
    assert_eq!(resolve_default(None, None, Some(&key)), json!("K"));
    assert_eq!(resolve_default(None, None, None), Value::Null);
}

#[test]
fn test_declared_null_is_still_a_default() {
    let declared = Value::Null;
    let array = json!("A");
    assert_eq!(resolve_default(Some(&declared), Some(&array), None), Value::Null);
}

#[test]
fn test_producer_only_runs_when_reached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let producer = DefaultSource::Producer(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        json!(["produced"])
    }));

    let array = json!("A");
    assert_eq!(resolve_default(None, Some(&array), Some(&producer)), json!("A"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(resolve_default(None, None, Some(&producer)), json!(["produced"]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
