use crate::common::{delay, logged_context};
use loadrx::{
    json, ActionCreator, Context, Listener, Loader, LoaderError, LoaderInput, LoaderOptions,
    LoaderSpec, LogicBuilder, OperationSet, OperationSetDescriptor, Reducer, Value,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

mod common;

fn users_spec() -> LoaderSpec {
    LoaderSpec::new().slice(
        "users",
        OperationSet::new()
            .operation(
                "loadUsersAsync",
                Loader::future(|_, _, _| async {
                    delay(2).await;
                    json!("some async data")
                }),
            )
            .operation("loadUsersSync", Loader::sync(|_, _, _| json!("some sync data"))),
    )
}

#[tokio::test]
async fn test_loaders_work() {
    let other_listener_ran = Arc::new(AtomicBool::new(false));
    let ran = other_listener_ran.clone();
    let logic = LogicBuilder::new("users")
        .loaders(users_spec(), LoaderOptions::default())
        .listener(
            "loadUsersSync",
            Listener::sync(move |_| {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            }),
        )
        .build(&Context::new().into_shared());

    assert_eq!(logic.value("users"), Some(Value::Null));
    assert_eq!(logic.value_keys(), vec!["users", "usersLoading"]);
    assert_eq!(
        logic.action_keys(),
        vec![
            "loadUsersAsync",
            "loadUsersAsyncFailure",
            "loadUsersAsyncSuccess",
            "loadUsersSync",
            "loadUsersSyncFailure",
            "loadUsersSyncSuccess",
        ]
    );

    logic.dispatch("loadUsersSync", &[]).unwrap();
    assert_eq!(logic.value("users"), Some(json!("some sync data")));
    assert!(other_listener_ran.load(Ordering::SeqCst));

    logic.dispatch("loadUsersAsync", &[]).unwrap();
    assert_eq!(logic.value("users"), Some(json!("some sync data")));
    delay(20).await;
    assert_eq!(logic.value("users"), Some(json!("some async data")));
}

#[test]
fn test_defaults_order() {
    let operations = || {
        OperationSet::new()
            .with_default("key")
            .operation("loadUsers", Loader::sync(|_, _, _| json!("some sync data")))
    };
    let context = Context::new().into_shared();
    let build = |logic: LogicBuilder, descriptor: OperationSetDescriptor| {
        logic
            .loaders(LoaderSpec::new().slice("users", descriptor), LoaderOptions::default())
            .build(&context)
    };

    let declared = build(
        LogicBuilder::new("declared").with_default("users", "default"),
        ("array", operations()).into(),
    );
    let array = build(LogicBuilder::new("array"), ("array", operations()).into());
    let key = build(LogicBuilder::new("key"), operations().into());
    let producer = build(
        LogicBuilder::new("producer"),
        OperationSet::new()
            .with_default_fn(|| json!("produced"))
            .operation("loadUsers", Loader::sync(|_, _, _| json!(1)))
            .into(),
    );
    let none = build(
        LogicBuilder::new("none"),
        OperationSet::new()
            .operation("loadUsers", Loader::sync(|_, _, _| json!(1)))
            .into(),
    );

    assert_eq!(declared.value("users"), Some(json!("default")));
    assert_eq!(array.value("users"), Some(json!("array")));
    assert_eq!(key.value("users"), Some(json!("key")));
    assert_eq!(producer.value("users"), Some(json!("produced")));
    assert_eq!(none.value("users"), Some(Value::Null));
    assert_eq!(none.value("usersLoading"), Some(json!(false)));
}

#[test]
fn test_can_override_actions_and_reducers() {
    let logic = LogicBuilder::new("users")
        .action("loadUsers", ActionCreator::constant("yesyesyes"))
        .loaders(
            LoaderSpec::new().slice(
                "users",
                OperationSet::new().operation(
                    "loadUsers",
                    Loader::sync(|payload: Value, _, _| payload),
                ),
            ),
            LoaderOptions::default(),
        )
        .build(&Context::new().into_shared());

    logic.dispatch("loadUsers", &[json!({ "value": "nonono" })]).unwrap();
    assert_eq!(logic.value("users"), Some(json!("yesyesyes")));
}

#[test]
fn test_declared_reducer_is_not_replaced() {
    let logic = LogicBuilder::new("users")
        .reducer(
            "users",
            Reducer::new(json!([])).on("loadUsersSuccess", |state, payload| {
                let mut list = state.as_array().cloned().unwrap_or_default();
                list.push(payload["users"].clone());
                Value::Array(list)
            }),
        )
        .loaders(
            LoaderSpec::new().slice(
                "users",
                OperationSet::new().operation("loadUsers", Loader::sync(|_, _, _| json!("bob"))),
            ),
            LoaderOptions::default(),
        )
        .build(&Context::new().into_shared());

    logic.dispatch("loadUsers", &[]).unwrap();
    logic.dispatch("loadUsers", &[]).unwrap();
    assert_eq!(logic.value("users"), Some(json!(["bob", "bob"])));
    assert_eq!(logic.value("usersLoading"), Some(json!(false)));
}

#[tokio::test]
async fn test_throwing_calls_failure() {
    let (context, log) = logged_context();
    let async_failure = Arc::new(Mutex::new(None));
    let sync_failure = Arc::new(Mutex::new(None));
    let (async_seen, sync_seen) = (async_failure.clone(), sync_failure.clone());

    let logic = LogicBuilder::new("users")
        .loaders(
            LoaderSpec::new().slice(
                "users",
                OperationSet::new()
                    .operation(
                        "loadUsersAsync",
                        Loader::future(|_, _, _| async {
                            delay(2).await;
                            Err::<Value, _>("async nope")
                        }),
                    )
                    .operation(
                        "loadUsersSync",
                        Loader::sync(|_, _, _| Err::<Value, _>("sync nope")),
                    ),
            ),
            LoaderOptions::default(),
        )
        .listener(
            "loadUsersAsyncFailure",
            Listener::sync(move |args| {
                *async_seen.lock().unwrap() = Some(args.payload["error"].clone());
                Ok(())
            }),
        )
        .listener(
            "loadUsersSyncFailure",
            Listener::sync(move |args| {
                *sync_seen.lock().unwrap() = Some(args.payload.clone());
                Ok(())
            }),
        )
        .build(&context);

    logic.dispatch("loadUsersSync", &[]).unwrap();
    assert_eq!(logic.value("users"), Some(Value::Null));
    assert_eq!(
        *sync_failure.lock().unwrap(),
        Some(json!({ "error": "sync nope", "errorObject": { "message": "sync nope" } }))
    );
    assert_eq!(log.failures(), vec!["sync nope"]);

    logic.dispatch("loadUsersAsync", &[]).unwrap().settled().await;
    assert_eq!(logic.value("users"), Some(Value::Null));
    assert_eq!(logic.value("usersLoading"), Some(json!(false)));
    assert_eq!(*async_failure.lock().unwrap(), Some(json!("async nope")));
    assert_eq!(log.failures(), vec!["sync nope", "async nope"]);
}

#[test]
fn test_success_payload_keeps_original_payload() {
    let seen = Arc::new(Mutex::new(None));
    let record = seen.clone();
    let logic = LogicBuilder::new("users")
        .loaders(
            LoaderSpec::new().slice(
                "user",
                OperationSet::new().operation(
                    "loadUser",
                    Loader::sync(|payload: Value, _, _| {
                        json!({ "name": "bob", "id": payload["id"] })
                    }),
                ),
            ),
            LoaderOptions::default(),
        )
        .listener(
            "loadUserSuccess",
            Listener::sync(move |args| {
                *record.lock().unwrap() = Some(args.payload);
                Ok(())
            }),
        )
        .build(&Context::new().into_shared());

    logic.dispatch("loadUser", &[json!({ "id": 1 })]).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        Some(json!({ "payload": { "id": 1 }, "user": { "name": "bob", "id": 1 } }))
    );
}

#[test]
fn test_computed_input_sees_earlier_declarations() {
    let logic = LogicBuilder::new("users")
        .with_default("users", json!(["cached"]))
        .action("refresh", ActionCreator::identity())
        .loaders(
            LoaderInput::computed(|logic: &LogicBuilder| {
                let operations = OperationSet::new()
                    .operation("loadUsers", Loader::sync(|_, _, _| json!(["fresh"])));
                let operations = if logic.has_action("refresh") {
                    operations.operation("refresh", Loader::sync(|_, _, _| json!(["refreshed"])))
                } else {
                    operations
                };
                LoaderSpec::new().slice("users", operations)
            }),
            LoaderOptions::default(),
        )
        .build(&Context::new().into_shared());

    assert_eq!(logic.value("users"), Some(json!(["cached"])));
    assert!(logic.has_action("refreshSuccess"));
    logic.dispatch("refresh", &[]).unwrap();
    assert_eq!(logic.value("users"), Some(json!(["refreshed"])));
}

#[test]
fn test_hooks_are_scoped_to_their_context() {
    let (logged, log) = logged_context();
    let quiet = Context::new().into_shared();
    let spec = || {
        LoaderSpec::new().slice(
            "users",
            OperationSet::new().operation(
                "load",
                Loader::sync(|_, _, _| Err::<Value, _>(LoaderError::failed("x"))),
            ),
        )
    };

    let recorded = LogicBuilder::new("recorded")
        .loaders(spec(), LoaderOptions::default())
        .build(&logged);
    let unrecorded = LogicBuilder::new("unrecorded")
        .loaders(spec(), LoaderOptions::default())
        .build(&quiet);

    unrecorded.dispatch("load", &[]).unwrap();
    assert!(log.entries().is_empty());

    recorded.dispatch("load", &[]).unwrap();
    assert_eq!(log.entries(), vec!["start load", "failure x"]);
}
