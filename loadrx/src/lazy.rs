use crate::{source_reducer, Logic, LogicBuilder, OperationSet, Selector};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

/// The public `<slice>` selector of a lazy loader.
///
/// It reads `<slice>Source`. After its first evaluation on a logic it
/// schedules one dispatch of the first declared operation on the current
/// tokio runtime. Reads outside a runtime leave the trigger armed.
pub fn synthesize_lazy_selector(
    logic: &LogicBuilder,
    slice: &str,
    operations: &OperationSet,
) -> Option<(String, Selector)> {
    if logic.has_selector(slice) || logic.has_reducer(slice) {
        return None;
    }
    let selector = Selector::new([source_reducer(slice)], |inputs| {
        inputs.first().cloned().unwrap_or(Value::Null)
    });
    let selector = match operations.first_operation() {
        Some(first) => {
            let action_key = first.to_string();
            let flag = lazy_flag(&action_key);
            selector.after_evaluate(move |logic| schedule_trigger(logic, &flag, &action_key))
        }
        None => selector,
    };
    Some((slice.to_string(), selector))
}

/// Cache key marking that the lazy trigger of `action_key` was scheduled.
pub fn lazy_flag(action_key: &str) -> String {
    format!("lazy-triggered:{action_key}")
}

fn schedule_trigger(logic: &Logic, flag: &str, action_key: &str) {
    let Ok(handle) = Handle::try_current() else {
        warn!(
            logic = %logic.path(),
            action_key = %action_key,
            "no tokio runtime, lazy trigger left for a later read"
        );
        return;
    };
    if !logic.cache().mark_once(flag) {
        return;
    }
    debug!(logic = %logic.path(), action_key = %action_key, "lazy trigger scheduled");
    let logic = logic.clone();
    let action_key = action_key.to_string();
    handle.spawn(async move {
        if let Err(dispatch_error) = logic.dispatch(&action_key, &[]) {
            error!(logic = %logic.path(), %dispatch_error, "lazy trigger failed");
        }
    });
}
