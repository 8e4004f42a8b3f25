use crate::DefaultSource;
use serde_json::Value;

/// Picks the initial value of a slice.
///
/// The first present source wins: a default declared on the logic, then the
/// array-form default, then `__default` (a producer is only invoked when
/// reached), then `null`.
pub fn resolve_default(
    declared: Option<&Value>,
    array_default: Option<&Value>,
    key_default: Option<&DefaultSource>,
) -> Value {
    if let Some(value) = declared {
        return value.clone();
    }
    if let Some(value) = array_default {
        return value.clone();
    }
    key_default.map(DefaultSource::resolve).unwrap_or(Value::Null)
}
