use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Represents the ways a loader invocation can end without a value.
///
/// A `Failed` error is routed into the `<op>Failure` action and the
/// `on_failure` hook. A `Breakpoint` error is the cancellation marker raised
/// by [`Breakpoint`](crate::Breakpoint) once a newer call for the same
/// trigger has started; it is never reported as a failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoaderError {
    /// The loader failed with a message and optional structured details.
    #[error("{message}")]
    Failed { message: String, details: Value },

    /// The call was superseded by a newer dispatch of the same trigger.
    #[error("Call was superseded by a newer trigger!")]
    Breakpoint,
}

#[derive(Serialize)]
struct ErrorObject<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    details: &'a Value,
}

impl LoaderError {
    pub fn failed(message: impl Into<String>) -> Self {
        LoaderError::Failed {
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(message: impl Into<String>, details: Value) -> Self {
        LoaderError::Failed {
            message: message.into(),
            details,
        }
    }

    /// Returns true if this error is the breakpoint cancellation marker.
    pub fn is_breakpoint(&self) -> bool {
        matches!(self, LoaderError::Breakpoint)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoaderError::Failed { .. })
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The error object carried by the `<op>Failure` action.
    pub fn to_value(&self) -> Value {
        let message = self.message();
        let none = Value::Null;
        let details = match self {
            LoaderError::Failed { details, .. } => details,
            LoaderError::Breakpoint => &none,
        };
        serde_json::to_value(ErrorObject {
            message: &message,
            details,
        })
        .unwrap_or(Value::String(message))
    }
}

impl From<String> for LoaderError {
    fn from(message: String) -> Self {
        LoaderError::failed(message)
    }
}

impl From<&str> for LoaderError {
    fn from(message: &str) -> Self {
        LoaderError::failed(message)
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(error: serde_json::Error) -> Self {
        LoaderError::failed(error.to_string())
    }
}

impl From<std::io::Error> for LoaderError {
    fn from(error: std::io::Error) -> Self {
        LoaderError::failed(error.to_string())
    }
}

/// Errors raised by the host container itself.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum LogicError {
    #[error("Unknown action `{0}`!")]
    UnknownAction(String),

    #[error("Plugin `{0}` is already installed!")]
    PluginAlreadyInstalled(&'static str),

    #[error("Action `{0}` started a pending listener outside of a tokio runtime!")]
    NoRuntime(String),
}

impl LogicError {
    pub fn is_no_runtime(&self) -> bool {
        matches!(self, LogicError::NoRuntime(_))
    }
}
