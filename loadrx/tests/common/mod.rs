use loadrx::{Context, LoadersOptions, LoadersPlugin};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
pub async fn delay(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Everything the loader hooks saw, in order.
#[derive(Clone, Default)]
pub struct HookLog {
    pub entries: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl HookLog {
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix("failure ").map(str::to_string))
            .collect()
    }
}

pub fn logged_context() -> (Arc<Context>, HookLog) {
    let log = HookLog::default();
    let (start, success, failure) = (log.clone(), log.clone(), log.clone());
    let options = LoadersOptions::new()
        .on_start(move |event| {
            start.entries.lock().unwrap().push(format!("start {}", event.action_key));
        })
        .on_success(move |event| {
            success
                .entries
                .lock()
                .unwrap()
                .push(format!("success {}", event.action_key));
        })
        .on_failure(move |event| {
            failure
                .entries
                .lock()
                .unwrap()
                .push(format!("failure {}", event.error));
        });
    let context = Context::new()
        .with_plugin(LoadersPlugin::new(options))
        .unwrap()
        .into_shared();
    (context, log)
}
