use crate::tracing_setup::tracing_init;
use loadrx::{
    json, Context, Loader, LoaderError, LoaderOptions, LoaderSpec, LoadersOptions, LoadersPlugin,
    LogicBuilder, OperationSet, Value,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

mod tracing_setup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_init();

    let options = LoadersOptions::new()
        .on_start(|event| debug!("Worker | start {}", event.action_key))
        .on_failure(|event| warn!("Worker | {} failed: {}", event.action_key, event.error));
    let context = Context::new()
        .with_plugin(LoadersPlugin::new(options))?
        .into_shared();

    let logic = LogicBuilder::new("search")
        .loaders(
            LoaderSpec::new().slice(
                "results",
                OperationSet::new().operation(
                    "search",
                    Loader::future(|query: Value, breakpoint, _| async move {
                        // debounce: only the last keystroke survives this point
                        breakpoint.delay(Duration::from_millis(150)).await?;
                        let results = search_index(query.as_str().unwrap_or_default()).await;
                        breakpoint.check()?;
                        Ok::<Value, LoaderError>(results)
                    }),
                ),
            ),
            LoaderOptions::default(),
        )
        .build(&context);

    info!("==========================================");
    warn!("A. Typing quickly, earlier calls stop at their breakpoint");
    let mut pending = Vec::new();
    for query in ["r", "ru", "rus", "rust"] {
        info!("  Main | typed {:?}", query);
        pending.push(logic.dispatch("search", &[json!(query)])?);
        sleep(Duration::from_millis(40)).await;
    }
    for dispatched in pending {
        dispatched.settled().await;
    }
    info!("  Main | results: {:?}", logic.value("results"));

    info!("==========================================");
    warn!("B. Pausing between keystrokes, every call completes");
    for query in ["tokio", "serde"] {
        logic.dispatch("search", &[json!(query)])?.settled().await;
        info!("  Main | results: {:?}", logic.value("results"));
    }

    info!("  Main | Finish");
    Ok(())
}

async fn search_index(query: &str) -> Value {
    sleep(Duration::from_millis(50)).await;
    let crates = ["rust-analyzer", "rustls", "serde", "serde_json", "tokio", "tokio-util"];
    crates
        .iter()
        .filter(|name| name.starts_with(query))
        .map(|name| json!(name))
        .collect()
}
