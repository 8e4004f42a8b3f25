use crate::{LoaderError, Logic, Plugin};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::error;

pub struct StartEvent<'a> {
    pub action_key: &'a str,
    pub reducer_key: &'a str,
    pub logic: &'a Logic,
}

pub struct SuccessEvent<'a> {
    pub response: &'a Value,
    pub action_key: &'a str,
    pub reducer_key: &'a str,
    pub logic: &'a Logic,
}

pub struct FailureEvent<'a> {
    pub error: &'a LoaderError,
    pub action_key: &'a str,
    pub reducer_key: &'a str,
    pub logic: &'a Logic,
}

pub type StartHook = Arc<dyn Fn(StartEvent<'_>) + Send + Sync>;
pub type SuccessHook = Arc<dyn Fn(SuccessEvent<'_>) + Send + Sync>;
pub type FailureHook = Arc<dyn Fn(FailureEvent<'_>) + Send + Sync>;

/// Hooks given to [`LoadersPlugin`]. Each one is optional.
#[derive(Clone, Default)]
pub struct LoadersOptions {
    on_start: Option<StartHook>,
    on_success: Option<SuccessHook>,
    on_failure: Option<FailureHook>,
}

impl LoadersOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start<F>(mut self, hook: F) -> Self
    where
        F: Fn(StartEvent<'_>) + Send + Sync + 'static,
    {
        self.on_start = Some(Arc::new(hook));
        self
    }

    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: Fn(SuccessEvent<'_>) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(hook));
        self
    }

    pub fn on_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(FailureEvent<'_>) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for LoadersOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadersOptions")
            .field("on_start", &self.on_start.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// Installs the loader lifecycle hooks into a [`Context`](crate::Context).
#[derive(Debug, Clone, Default)]
pub struct LoadersPlugin {
    options: LoadersOptions,
}

impl LoadersPlugin {
    pub fn new(options: LoadersOptions) -> Self {
        LoadersPlugin { options }
    }
}

impl Plugin for LoadersPlugin {
    const NAME: &'static str = "loaders";
    type Context = LoadersContext;

    fn into_context(self) -> LoadersContext {
        let LoadersOptions {
            on_start,
            on_success,
            on_failure,
        } = self.options;
        let defaults = LoadersContext::default();
        LoadersContext {
            on_start: on_start.unwrap_or(defaults.on_start),
            on_success: on_success.unwrap_or(defaults.on_success),
            on_failure: on_failure.unwrap_or(defaults.on_failure),
        }
    }
}

/// The resolved hooks, shared by every loader listener of one context.
#[derive(Clone)]
pub struct LoadersContext {
    on_start: StartHook,
    on_success: SuccessHook,
    on_failure: FailureHook,
}

impl LoadersContext {
    /// The installed record, or the default hooks when the plugin is absent.
    pub fn of(logic: &Logic) -> Arc<LoadersContext> {
        logic
            .context()
            .plugin::<LoadersPlugin>()
            .unwrap_or_else(|| Arc::new(LoadersContext::default()))
    }

    pub fn start(&self, event: StartEvent<'_>) {
        (self.on_start)(event)
    }

    pub fn success(&self, event: SuccessEvent<'_>) {
        (self.on_success)(event)
    }

    pub fn failure(&self, event: FailureEvent<'_>) {
        (self.on_failure)(event)
    }
}

impl Default for LoadersContext {
    fn default() -> Self {
        LoadersContext {
            on_start: Arc::new(ignore_start),
            on_success: Arc::new(ignore_success),
            on_failure: Arc::new(log_failure),
        }
    }
}

fn ignore_start(_: StartEvent<'_>) {}

fn ignore_success(_: SuccessEvent<'_>) {}

fn log_failure(event: FailureEvent<'_>) {
    error!(
        logic = %event.logic.path(),
        action_key = event.action_key,
        reducer_key = event.reducer_key,
        error = %event.error,
        "Error in {} for {}",
        event.action_key,
        event.reducer_key
    );
}

impl fmt::Debug for LoadersContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoadersContext")
    }
}
