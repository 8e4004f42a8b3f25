use crate::{Action, Breakpoint, LoaderError};
use futures_core::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Anything a loader may return: a value, a `Result`, or an `Option`.
pub trait LoaderOutput {
    fn into_loaded(self) -> Result<Value, LoaderError>;
}

impl LoaderOutput for Value {
    fn into_loaded(self) -> Result<Value, LoaderError> {
        Ok(self)
    }
}

impl<E> LoaderOutput for Result<Value, E>
where
    E: Into<LoaderError>,
{
    fn into_loaded(self) -> Result<Value, LoaderError> {
        self.map_err(Into::into)
    }
}

impl LoaderOutput for Option<Value> {
    fn into_loaded(self) -> Result<Value, LoaderError> {
        self.ok_or_else(|| LoaderError::failed("Operation returned None!"))
    }
}

/// What a loader hands back: a settled result or a future of one.
pub enum LoaderResult {
    Ready(Result<Value, LoaderError>),
    Pending(BoxFuture<'static, Result<Value, LoaderError>>),
}

impl LoaderResult {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoaderResult::Pending(_))
    }

    pub async fn resolve(self) -> Result<Value, LoaderError> {
        match self {
            LoaderResult::Ready(result) => result,
            LoaderResult::Pending(future) => future.await,
        }
    }
}

type LoaderFn = dyn Fn(Value, Breakpoint, Action) -> LoaderResult + Send + Sync;

/// A user function invoked with `(payload, breakpoint, action)`.
#[derive(Clone)]
pub struct Loader(Arc<LoaderFn>);

impl Loader {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn(Value, Breakpoint, Action) -> LoaderResult + Send + Sync + 'static,
    {
        Loader(Arc::new(loader))
    }

    pub fn sync<F, R>(loader: F) -> Self
    where
        F: Fn(Value, Breakpoint, Action) -> R + Send + Sync + 'static,
        R: LoaderOutput,
    {
        Self::new(move |payload, breakpoint, action| {
            LoaderResult::Ready(loader(payload, breakpoint, action).into_loaded())
        })
    }

    pub fn future<F, Fut, R>(loader: F) -> Self
    where
        F: Fn(Value, Breakpoint, Action) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: LoaderOutput + 'static,
    {
        Self::new(move |payload, breakpoint, action| {
            let future = loader(payload, breakpoint, action);
            LoaderResult::Pending(Box::pin(async move { future.await.into_loaded() }))
        })
    }

    pub fn call(&self, payload: Value, breakpoint: Breakpoint, action: Action) -> LoaderResult {
        (self.0)(payload, breakpoint, action)
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Loader")
    }
}
