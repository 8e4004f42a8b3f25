use crate::{
    failure_action, loading_reducer, source_reducer, success_action, LogicBuilder, OperationSet,
    Reducer,
};
use serde_json::Value;

/// Value and loading reducers of a slice, skipping any already declared.
///
/// In lazy mode the value reducer is stored under `<slice>Source`.
pub fn synthesize_reducers(
    logic: &LogicBuilder,
    slice: &str,
    operations: &OperationSet,
    default: Value,
    lazy: bool,
) -> Vec<(String, Reducer)> {
    let mut reducers = Vec::new();

    let value_key = if lazy {
        source_reducer(slice)
    } else {
        slice.to_string()
    };
    if !logic.has_reducer(&value_key) {
        reducers.push((value_key, value_reducer(slice, operations, default)));
    }

    let loading_key = loading_reducer(slice);
    if !logic.has_reducer(&loading_key) {
        reducers.push((loading_key, loading(operations)));
    }

    reducers
}

fn value_reducer(slice: &str, operations: &OperationSet, default: Value) -> Reducer {
    operations.names().fold(Reducer::new(default), |reducer, operation| {
        let slice = slice.to_string();
        reducer.on(success_action(operation), move |_, payload| {
            payload.get(&slice).cloned().unwrap_or(Value::Null)
        })
    })
}

fn loading(operations: &OperationSet) -> Reducer {
    operations.names().fold(Reducer::new(false), |reducer, operation| {
        reducer
            .on(operation, |_, _| Value::Bool(true))
            .on(success_action(operation), |_, _| Value::Bool(false))
            .on(failure_action(operation), |_, _| Value::Bool(false))
    })
}
