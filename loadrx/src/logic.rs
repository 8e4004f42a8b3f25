use crate::breakpoint::CallEpoch;
use crate::{Breakpoint, Context, LoaderError, LogicError};
use futures_core::future::BoxFuture;
use futures_signals::signal::{Mutable, MutableSignalCloned, SignalExt, SignalStream};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

pub type StateMap = BTreeMap<String, Value>;

/// A dispatched action: its name and the payload built by its creator.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: String,
    pub payload: Value,
}

/// Builds an action payload from the arguments passed to `dispatch`.
#[derive(Clone)]
pub struct ActionCreator(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl ActionCreator {
    pub fn new<F>(creator: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        ActionCreator(Arc::new(creator))
    }

    /// Passes the first argument through, `null` when there is none.
    pub fn identity() -> Self {
        Self::new(|args| args.first().cloned().unwrap_or(Value::Null))
    }

    /// Ignores the arguments and always produces `payload`.
    pub fn constant(payload: impl Into<Value>) -> Self {
        let payload = payload.into();
        Self::new(move |_| payload.clone())
    }

    pub fn create(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }
}

impl fmt::Debug for ActionCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionCreator")
    }
}

type ReduceFn = Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>;

/// A state field: its default and one handler per action name.
#[derive(Clone)]
pub struct Reducer {
    default: Value,
    handlers: BTreeMap<String, ReduceFn>,
}

impl Reducer {
    pub fn new(default: impl Into<Value>) -> Self {
        Reducer {
            default: default.into(),
            handlers: BTreeMap::new(),
        }
    }

    pub fn on<F>(mut self, action: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.handlers.insert(action.into(), Arc::new(handler));
        self
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn handles(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer")
            .field("default", &self.default)
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

type ComputeFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;
type EvaluateHook = Arc<dyn Fn(&Logic) + Send + Sync>;

/// A derived value computed from other values of the same logic.
#[derive(Clone)]
pub struct Selector {
    inputs: Vec<String>,
    compute: ComputeFn,
    after_evaluate: Option<EvaluateHook>,
}

impl Selector {
    pub fn new<I, S, F>(inputs: I, compute: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Selector {
            inputs: inputs.into_iter().map(Into::into).collect(),
            compute: Arc::new(compute),
            after_evaluate: None,
        }
    }

    /// Runs `hook` after every evaluation, once the value has been computed.
    pub fn after_evaluate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Logic) + Send + Sync + 'static,
    {
        self.after_evaluate = Some(Arc::new(hook));
        self
    }

    pub fn has_after_evaluate(&self) -> bool {
        self.after_evaluate.is_some()
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("inputs", &self.inputs)
            .field("after_evaluate", &self.after_evaluate.is_some())
            .finish()
    }
}

/// Everything a listener receives for one invocation.
#[derive(Debug, Clone)]
pub struct ListenerArgs {
    pub logic: Logic,
    pub payload: Value,
    pub breakpoint: Breakpoint,
    pub action: Action,
}

pub enum ListenerOutcome {
    Done(Result<(), LoaderError>),
    /// Continuation handed back to the host, which spawns and supervises it.
    Pending(BoxFuture<'static, Result<(), LoaderError>>),
}

#[derive(Clone)]
pub struct Listener(Arc<dyn Fn(ListenerArgs) -> ListenerOutcome + Send + Sync>);

impl Listener {
    pub fn new<F>(listener: F) -> Self
    where
        F: Fn(ListenerArgs) -> ListenerOutcome + Send + Sync + 'static,
    {
        Listener(Arc::new(listener))
    }

    pub fn sync<F>(listener: F) -> Self
    where
        F: Fn(ListenerArgs) -> Result<(), LoaderError> + Send + Sync + 'static,
    {
        Self::new(move |args| ListenerOutcome::Done(listener(args)))
    }

    pub fn future<F, Fut>(listener: F) -> Self
    where
        F: Fn(ListenerArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), LoaderError>> + Send + 'static,
    {
        Self::new(move |args| ListenerOutcome::Pending(Box::pin(listener(args))))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Listener")
    }
}

/// A batch of declarations applied to a builder in one step.
#[derive(Debug, Default)]
pub struct Extension {
    pub actions: Vec<(String, ActionCreator)>,
    pub reducers: Vec<(String, Reducer)>,
    pub selectors: Vec<(String, Selector)>,
    pub listeners: Vec<(String, Listener)>,
}

impl Extension {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
            && self.reducers.is_empty()
            && self.selectors.is_empty()
            && self.listeners.is_empty()
    }
}

/// A logic under construction.
#[derive(Debug)]
pub struct LogicBuilder {
    path: String,
    defaults: StateMap,
    actions: BTreeMap<String, ActionCreator>,
    reducers: BTreeMap<String, Reducer>,
    selectors: BTreeMap<String, Selector>,
    listeners: BTreeMap<String, Vec<Listener>>,
}

impl LogicBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        LogicBuilder {
            path: path.into(),
            defaults: StateMap::new(),
            actions: BTreeMap::new(),
            reducers: BTreeMap::new(),
            selectors: BTreeMap::new(),
            listeners: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declares the initial value of `key`, overriding any reducer default.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn action(mut self, name: impl Into<String>, creator: ActionCreator) -> Self {
        self.actions.insert(name.into(), creator);
        self
    }

    pub fn reducer(mut self, name: impl Into<String>, reducer: Reducer) -> Self {
        self.reducers.insert(name.into(), reducer);
        self
    }

    pub fn selector(mut self, name: impl Into<String>, selector: Selector) -> Self {
        self.selectors.insert(name.into(), selector);
        self
    }

    pub fn listener(mut self, action: impl Into<String>, listener: Listener) -> Self {
        self.listeners.entry(action.into()).or_default().push(listener);
        self
    }

    pub fn extend<F>(mut self, step: F) -> Self
    where
        F: FnOnce(&mut LogicBuilder),
    {
        step(&mut self);
        self
    }

    pub fn apply(&mut self, extension: Extension) {
        let Extension {
            actions,
            reducers,
            selectors,
            listeners,
        } = extension;
        self.actions.extend(actions);
        self.reducers.extend(reducers);
        self.selectors.extend(selectors);
        for (action, listener) in listeners {
            self.listeners.entry(action).or_default().push(listener);
        }
    }

    pub fn default_for(&self, key: &str) -> Option<&Value> {
        self.defaults.get(key)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn has_reducer(&self, name: &str) -> bool {
        self.reducers.contains_key(name)
    }

    pub fn has_selector(&self, name: &str) -> bool {
        self.selectors.contains_key(name)
    }

    pub fn action_keys(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Mounts the logic on `context`.
    pub fn build(self, context: &Arc<Context>) -> Logic {
        let LogicBuilder {
            path,
            defaults,
            actions,
            reducers,
            selectors,
            listeners,
        } = self;

        let state: StateMap = reducers
            .iter()
            .map(|(key, reducer)| {
                let initial = defaults
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| reducer.default.clone());
                (key.clone(), initial)
            })
            .collect();

        let listeners = listeners
            .into_iter()
            .map(|(action, listeners)| {
                let slots = listeners
                    .into_iter()
                    .map(|listener| ListenerSlot {
                        listener,
                        epoch: CallEpoch::default(),
                    })
                    .collect();
                (action, slots)
            })
            .collect();

        debug!(logic = %path, actions = actions.len(), reducers = reducers.len(), "logic mounted");

        Logic {
            inner: Arc::new(LogicInner {
                path,
                context: context.clone(),
                state: Mutable::new(state),
                actions,
                reducers,
                selectors,
                listeners,
                cache: LogicCache::default(),
            }),
        }
    }
}

struct ListenerSlot {
    listener: Listener,
    epoch: CallEpoch,
}

/// Per-logic scratch storage.
#[derive(Debug, Default)]
pub struct LogicCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl LogicCache {
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.lock().insert(key.into(), value)
    }

    /// Sets the flag `key` and returns true only for the first caller.
    pub fn mark_once(&self, key: &str) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(key) {
            false
        } else {
            entries.insert(key.to_string(), Value::Bool(true));
            true
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LogicInner {
    path: String,
    context: Arc<Context>,
    state: Mutable<StateMap>,
    actions: BTreeMap<String, ActionCreator>,
    reducers: BTreeMap<String, Reducer>,
    selectors: BTreeMap<String, Selector>,
    listeners: BTreeMap<String, Vec<ListenerSlot>>,
    cache: LogicCache,
}

/// Handle to a mounted logic.
#[derive(Clone)]
pub struct Logic {
    inner: Arc<LogicInner>,
}

impl Logic {
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.inner.context
    }

    pub fn cache(&self) -> &LogicCache {
        &self.inner.cache
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.inner.actions.contains_key(name)
    }

    pub fn action_keys(&self) -> Vec<&str> {
        self.inner.actions.keys().map(String::as_str).collect()
    }

    /// Keys of every reducer and selector, in name order.
    pub fn value_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .inner
            .reducers
            .keys()
            .chain(self.inner.selectors.keys())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn get_state(&self) -> StateMap {
        self.inner.state.get_cloned()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<StateMap> {
        self.inner.state.signal_cloned()
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<StateMap>> {
        self.inner.state.signal_cloned().to_stream()
    }

    /// Reads a reducer field or evaluates a selector.
    pub fn value(&self, key: &str) -> Option<Value> {
        if let Some(selector) = self.inner.selectors.get(key) {
            let inputs: Vec<Value> = selector
                .inputs
                .iter()
                .map(|input| self.value(input).unwrap_or(Value::Null))
                .collect();
            let value = (selector.compute)(&inputs);
            if let Some(hook) = &selector.after_evaluate {
                hook(self);
            }
            return Some(value);
        }
        self.inner.state.lock_ref().get(key).cloned()
    }

    pub fn values(&self) -> StateMap {
        self.value_keys()
            .into_iter()
            .map(|key| (key.to_string(), self.value(key).unwrap_or(Value::Null)))
            .collect()
    }

    /// Builds the action, reduces it into state, then runs its listeners.
    ///
    /// Synchronous listeners finish before this returns. Pending ones are
    /// spawned on the current tokio runtime and collected in the result.
    /// Without a runtime a pending listener is dropped and the dispatch
    /// fails with [`LogicError::NoRuntime`] once every listener has run.
    pub fn dispatch(&self, name: &str, args: &[Value]) -> Result<Dispatched, LogicError> {
        let creator = self
            .inner
            .actions
            .get(name)
            .ok_or_else(|| LogicError::UnknownAction(name.to_string()))?;
        let action = Action {
            kind: name.to_string(),
            payload: creator.create(args),
        };
        trace!(
            logic = %self.inner.path,
            action = %action.kind,
            payload = %action.payload,
            "dispatch"
        );

        self.reduce(&action);
        self.run_listeners(action)
    }

    fn reduce(&self, action: &Action) {
        let mut state = self.inner.state.lock_mut();
        for (key, reducer) in &self.inner.reducers {
            if let Some(handler) = reducer.handlers.get(&action.kind) {
                let current = state.get(key).cloned().unwrap_or(Value::Null);
                state.insert(key.clone(), handler(&current, &action.payload));
            }
        }
    }

    fn run_listeners(&self, action: Action) -> Result<Dispatched, LogicError> {
        let mut dispatched = Dispatched::default();
        let mut orphaned = false;
        let Some(slots) = self.inner.listeners.get(&action.kind) else {
            return Ok(dispatched);
        };
        for slot in slots {
            let args = ListenerArgs {
                logic: self.clone(),
                payload: action.payload.clone(),
                breakpoint: slot.epoch.advance(),
                action: action.clone(),
            };
            match (slot.listener.0)(args) {
                ListenerOutcome::Done(result) => report(&self.inner.path, &action.kind, result),
                ListenerOutcome::Pending(continuation) => {
                    let Ok(handle) = Handle::try_current() else {
                        error!(
                            logic = %self.inner.path,
                            action = %action.kind,
                            "no tokio runtime, pending listener dropped"
                        );
                        orphaned = true;
                        continue;
                    };
                    let path = self.inner.path.clone();
                    let kind = action.kind.clone();
                    dispatched.tasks.push(handle.spawn(async move {
                        report(&path, &kind, continuation.await);
                    }));
                }
            }
        }
        if orphaned {
            return Err(LogicError::NoRuntime(action.kind));
        }
        Ok(dispatched)
    }
}

fn report(path: &str, action: &str, result: Result<(), LoaderError>) {
    match result {
        Ok(()) => {}
        Err(LoaderError::Breakpoint) => {
            debug!(logic = %path, action = %action, "listener stopped at breakpoint")
        }
        Err(error) => error!(logic = %path, action = %action, %error, "listener failed"),
    }
}

impl fmt::Debug for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logic")
            .field("path", &self.inner.path)
            .field("state", &self.inner.state.get_cloned())
            .finish()
    }
}

/// Continuations spawned by one dispatch.
#[derive(Debug, Default)]
pub struct Dispatched {
    tasks: Vec<JoinHandle<()>>,
}

impl Dispatched {
    pub fn is_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Waits until every spawned continuation has finished.
    pub async fn settled(self) {
        for task in self.tasks {
            if let Err(join_error) = task.await {
                error!(%join_error, "listener task aborted");
            }
        }
    }
}
