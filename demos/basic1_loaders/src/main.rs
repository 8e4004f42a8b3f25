use crate::tracing_setup::tracing_init;
use loadrx::{
    json, Context, Loader, LoaderError, LoaderOptions, LoaderSpec, LoadersOptions, LoadersPlugin,
    LogicBuilder, OperationSet, Value,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

mod tracing_setup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_init();

    let options = LoadersOptions::new()
        .on_start(|event| info!("  Hook | start {} for {}", event.action_key, event.reducer_key))
        .on_success(|event| info!("  Hook | {} returned {}", event.action_key, event.response));
    let context = Context::new()
        .with_plugin(LoadersPlugin::new(options))?
        .into_shared();

    let logic = LogicBuilder::new("users")
        .loaders(
            LoaderSpec::new().slice(
                "users",
                (
                    json!([]),
                    OperationSet::new()
                        .operation("loadUsers", Loader::future(|_, _, _| fetch_users()))
                        .operation(
                            "addUser",
                            Loader::sync(|name: Value, _, _| json!([name])),
                        )
                        .operation(
                            "loadBroken",
                            Loader::sync(|_, _, _| Err::<Value, _>("backend unavailable")),
                        ),
                ),
            ),
            LoaderOptions::default(),
        )
        .build(&context);

    info!("==========================================");
    warn!("A. Synchronous loader");
    logic.dispatch("addUser", &[json!("bob")])?;
    info!("  Main | users: {:?}", logic.value("users"));

    info!("==========================================");
    warn!("B. Asynchronous loader");
    let dispatched = logic.dispatch("loadUsers", &[])?;
    info!("  Main | loading: {:?}", logic.value("usersLoading"));
    dispatched.settled().await;
    info!("  Main | users: {:?}", logic.value("users"));

    info!("==========================================");
    warn!("C. Failing loader, reported by the default failure hook");
    logic.dispatch("loadBroken", &[])?;
    info!("  Main | users unchanged: {:?}", logic.value("users"));

    info!("  Main | Finish");
    Ok(())
}

async fn fetch_users() -> Result<Value, LoaderError> {
    sleep(Duration::from_millis(200)).await;
    Ok(json!(["ada", "grace", "linus"]))
}
