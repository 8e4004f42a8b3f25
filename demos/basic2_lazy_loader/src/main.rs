use crate::tracing_setup::tracing_init;
use futures_signals::signal::SignalExt;
use loadrx::{
    json, Context, Loader, LoaderError, LoaderOptions, LoaderSpec, LoadersPlugin, LogicBuilder,
    OperationSet, Value,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

mod tracing_setup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_init();

    let context = Context::new()
        .with_plugin(LoadersPlugin::default())?
        .into_shared();

    let logic = LogicBuilder::new("settings")
        .loaders(
            LoaderSpec::new().slice(
                "settings",
                OperationSet::new()
                    .with_default_fn(|| json!({ "theme": "system" }))
                    .operation(
                        "loadSettings",
                        Loader::future(|_, breakpoint, _| async move {
                            breakpoint.delay(Duration::from_millis(300)).await?;
                            Ok::<Value, LoaderError>(json!({ "theme": "dark" }))
                        }),
                    ),
            ),
            LoaderOptions::lazy(),
        )
        .build(&context);

    info!("==========================================");
    warn!("A. Nothing loads until the value is read");
    sleep(Duration::from_millis(100)).await;
    info!("  Main | source: {:?}", logic.value("settingsSource"));

    info!("==========================================");
    warn!("B. First read schedules loadSettings");
    info!("  Main | settings: {:?}", logic.value("settings"));
    info!("  Main | settings: {:?}", logic.value("settings"));

    logic
        .to_signal()
        .stop_if(|state| state.get("settingsSource") == Some(&json!({ "theme": "dark" })))
        .for_each(|state| {
            info!("  Main | show state: {:?}", state);
            async {}
        })
        .await;

    info!("  Main | settings: {:?}", logic.value("settings"));
    info!("  Main | Finish");
    Ok(())
}
