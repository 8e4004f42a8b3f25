use crate::{failure_action, success_action, ActionCreator, LogicBuilder, OperationSet};
use serde_json::{Map, Value};

/// Trigger, success and failure creators for every operation of a slice.
///
/// A name already declared on `logic` is left alone, so a hand-written
/// creator keeps its payload shape.
pub fn synthesize_actions(
    logic: &LogicBuilder,
    slice: &str,
    operations: &OperationSet,
) -> Vec<(String, ActionCreator)> {
    let mut actions = Vec::new();
    for operation in operations.names() {
        if !logic.has_action(operation) {
            actions.push((operation.to_string(), ActionCreator::identity()));
        }
        let success = success_action(operation);
        if !logic.has_action(&success) {
            actions.push((success, success_creator(slice)));
        }
        let failure = failure_action(operation);
        if !logic.has_action(&failure) {
            actions.push((failure, failure_creator()));
        }
    }
    actions
}

/// `(value, payload)` to `{ payload, <slice>: value }`.
fn success_creator(slice: &str) -> ActionCreator {
    let slice = slice.to_string();
    ActionCreator::new(move |args| {
        let mut payload = Map::new();
        payload.insert("payload".to_string(), arg(args, 1));
        payload.insert(slice.clone(), arg(args, 0));
        Value::Object(payload)
    })
}

/// `(message, errorObject)` to `{ error, errorObject }`.
fn failure_creator() -> ActionCreator {
    ActionCreator::new(|args| {
        let mut payload = Map::new();
        payload.insert("error".to_string(), arg(args, 0));
        payload.insert("errorObject".to_string(), arg(args, 1));
        Value::Object(payload)
    })
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Null)
}
