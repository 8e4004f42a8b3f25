use crate::{Context, Loader, LoaderError, LoadersOptions, LoadersPlugin};
use serde_json::Value;
use std::sync::{Arc, Mutex};

mod defaults_test;

pub fn bare_context() -> Arc<Context> {
    Context::new().into_shared()
}

/// A context whose failure hook records every error message.
pub fn recording_context() -> (Arc<Context>, Arc<Mutex<Vec<String>>>) {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let recorded = errors.clone();
    let options = LoadersOptions::new().on_failure(move |event| {
        recorded.lock().unwrap().push(event.error.message());
    });
    let context = Context::new()
        .with_plugin(LoadersPlugin::new(options))
        .unwrap()
        .into_shared();
    (context, errors)
}

pub fn returning(value: Value) -> Loader {
    Loader::sync(move |_, _, _| value.clone())
}

pub fn failing(message: &'static str) -> Loader {
    Loader::sync(move |_, _, _| Err::<Value, _>(LoaderError::failed(message)))
}
