use crate::{
    failure_action, success_action, FailureEvent, Listener, ListenerArgs, ListenerOutcome, Loader,
    LoaderError, LoaderResult, LoadersContext, Logic, OperationSet, StartEvent, SuccessEvent,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// One listener per operation, bound to the operation's trigger action.
pub fn synthesize_listeners(slice: &str, operations: &OperationSet) -> Vec<(String, Listener)> {
    operations
        .operations()
        .iter()
        .map(|(operation, loader)| {
            let call = Arc::new(LoaderCall {
                action_key: operation.clone(),
                reducer_key: slice.to_string(),
                loader: loader.clone(),
            });
            let listener = Listener::new(move |args| call.clone().invoke(args));
            (operation.clone(), listener)
        })
        .collect()
}

struct LoaderCall {
    action_key: String,
    reducer_key: String,
    loader: Loader,
}

impl LoaderCall {
    fn invoke(self: Arc<Self>, args: ListenerArgs) -> ListenerOutcome {
        let ListenerArgs {
            logic,
            payload,
            breakpoint,
            action,
        } = args;
        let hooks = LoadersContext::of(&logic);

        hooks.start(StartEvent {
            action_key: &self.action_key,
            reducer_key: &self.reducer_key,
            logic: &logic,
        });

        match self.loader.call(payload.clone(), breakpoint, action) {
            LoaderResult::Ready(result) => {
                self.settle(&logic, &hooks, payload, result);
                ListenerOutcome::Done(Ok(()))
            }
            LoaderResult::Pending(response) => ListenerOutcome::Pending(Box::pin(async move {
                let result = response.await;
                self.settle(&logic, &hooks, payload, result);
                Ok(())
            })),
        }
    }

    fn settle(
        &self,
        logic: &Logic,
        hooks: &LoadersContext,
        payload: Value,
        result: Result<Value, LoaderError>,
    ) {
        match result {
            Ok(response) => {
                hooks.success(SuccessEvent {
                    response: &response,
                    action_key: &self.action_key,
                    reducer_key: &self.reducer_key,
                    logic,
                });
                self.dispatch(logic, success_action(&self.action_key), &[response, payload]);
            }
            Err(LoaderError::Breakpoint) => {
                debug!(
                    logic = %logic.path(),
                    action_key = %self.action_key,
                    reducer_key = %self.reducer_key,
                    "superseded call dropped"
                );
            }
            Err(error) => {
                hooks.failure(FailureEvent {
                    error: &error,
                    action_key: &self.action_key,
                    reducer_key: &self.reducer_key,
                    logic,
                });
                let args = [Value::String(error.message()), error.to_value()];
                self.dispatch(logic, failure_action(&self.action_key), &args);
            }
        }
    }

    fn dispatch(&self, logic: &Logic, action: String, args: &[Value]) {
        // Listeners of the outcome action run detached from this call.
        if let Err(dispatch_error) = logic.dispatch(&action, args) {
            error!(
                logic = %logic.path(),
                reducer_key = %self.reducer_key,
                %dispatch_error,
                "could not dispatch {}",
                action
            );
        }
    }
}
