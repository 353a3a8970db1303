//! End-to-end tests: plugin content merged into a lifecycle app, dispatched
//! through the pluggable host.

use hook_system::{FnHandler, HookError, HookHandler};
use plugin_host::{LifecycleApp, PluginContent};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Log = Arc<Mutex<Vec<String>>>;

fn delayed_logger(id: &str, delay_ms: u64, log: Log) -> Arc<dyn HookHandler> {
    let id = id.to_string();
    FnHandler::arc(id.clone(), move |_host, _args| {
        let id = id.clone();
        let log = log.clone();
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            log.lock().unwrap().push(id.clone());
            Ok(json!(id))
        })
    })
}

#[tokio::test]
async fn handlers_run_in_registration_order_not_completion_order() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = LifecycleApp::with_content(
        PluginContent::new()
            .hook("on_show", delayed_logger("a", 30, log.clone()))
            .hook("on_show", delayed_logger("b", 10, log.clone()))
            .hook("on_show", delayed_logger("c", 0, log.clone())),
    )
    .unwrap();

    let results = app.dispatch("on_show", &[]).await.unwrap();

    // Concurrent execution would complete c, b, a.
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(results, vec![json!("a"), json!("b"), json!("c")]);
}

#[tokio::test]
async fn a_failing_handler_stops_the_queue_and_surfaces_its_error() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let failing: Arc<dyn HookHandler> = FnHandler::arc("second", |_host, _args| {
        Box::pin(async move { Err(HookError::execution("on_show", "second", "exploded")) })
    });

    let app = LifecycleApp::with_content(
        PluginContent::new()
            .hook("on_show", delayed_logger("first", 0, log.clone()))
            .hook("on_show", failing)
            .hook("on_show", delayed_logger("third", 0, log.clone())),
    )
    .unwrap();

    let err = app.dispatch("on_show", &[]).await.unwrap_err();
    assert!(matches!(err, HookError::HandlerExecution { handler, .. } if handler == "second"));
    assert_eq!(*log.lock().unwrap(), vec!["first"]);
}

#[tokio::test]
async fn error_sink_observes_each_failure_exactly_once() {
    let app = LifecycleApp::with_content(PluginContent::new().hook(
        "on_hide",
        FnHandler::arc("bad", |_host, _args| {
            Box::pin(async move { Err(HookError::execution("on_hide", "bad", "nope")) })
        }),
    ))
    .unwrap();

    let seen: Log = Arc::new(Mutex::new(Vec::new()));
    let sink_log = seen.clone();
    app.set_on_error(move |err| sink_log.lock().unwrap().push(err.to_string()));

    let err = app.dispatch("on_hide", &[]).await.unwrap_err();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], err.to_string());
}

#[tokio::test]
async fn init_routines_run_before_launch_handlers_on_every_launch() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let init_log = log.clone();
    let app = LifecycleApp::with_content(
        PluginContent::named("booter", "1.0.0")
            .init(move |_host| {
                init_log.lock().unwrap().push("init".to_string());
                Ok(())
            })
            .hook("on_launch", delayed_logger("launch", 5, log.clone())),
    )
    .unwrap();

    app.dispatch("on_launch", &[]).await.unwrap();
    app.dispatch("on_launch", &[]).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["init", "launch", "init", "launch"]
    );
}

#[tokio::test]
async fn init_failures_skip_the_error_sink_and_the_launch_queue() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = LifecycleApp::with_content(
        PluginContent::new()
            .init(|_host| Err(HookError::execution("on_launch", "init", "bad boot")))
            .hook("on_launch", delayed_logger("launch", 0, log.clone())),
    )
    .unwrap();

    let sink_calls = Arc::new(Mutex::new(0u32));
    let sink_seen = sink_calls.clone();
    app.set_on_error(move |_err| *sink_seen.lock().unwrap() += 1);

    let err = app.dispatch("on_launch", &[]).await.unwrap_err();
    assert!(matches!(err, HookError::BeforeCall { .. }));
    assert_eq!(*sink_calls.lock().unwrap(), 0);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_hooks_dispatch_to_empty_results() {
    let app = LifecycleApp::new();

    let sink_calls = Arc::new(Mutex::new(0u32));
    let sink_seen = sink_calls.clone();
    app.set_on_error(move |_err| *sink_seen.lock().unwrap() += 1);

    for hook in ["on_launch", "on_show", "on_hide", "on_page_not_found"] {
        let results = app.dispatch(hook, &[]).await.unwrap();
        assert!(results.is_empty(), "hook '{hook}' yielded results");
    }
    assert_eq!(*sink_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn dispatch_arguments_reach_every_handler() {
    let seen: Arc<Mutex<Vec<Vec<Value>>>> = Arc::new(Mutex::new(Vec::new()));

    let make = |id: &str| {
        let seen = seen.clone();
        FnHandler::arc(id.to_string(), move |_host, args| {
            seen.lock().unwrap().push(args.to_vec());
            Box::pin(async move { Ok(json!(null)) })
        })
    };

    let app = LifecycleApp::with_content(
        PluginContent::new()
            .hook("on_page_not_found", make("h1"))
            .hook("on_page_not_found", make("h2")),
    )
    .unwrap();

    let args = vec![json!({"path": "/missing"})];
    app.dispatch("on_page_not_found", &args).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|observed| observed == &args));
}

#[tokio::test]
async fn handlers_can_read_fields_merged_from_other_plugins() {
    let app = LifecycleApp::with_contents([
        PluginContent::named("config", "1.0.0").field("greeting", json!("hello from config")),
        PluginContent::named("greeter", "1.0.0").hook(
            "on_show",
            FnHandler::arc("greet", |host, _args| {
                let greeting = host.field("greeting").unwrap_or(json!(null));
                Box::pin(async move { Ok(greeting) })
            }),
        ),
    ])
    .unwrap();

    let results = app.dispatch("on_show", &[]).await.unwrap();
    assert_eq!(results, vec![json!("hello from config")]);
}
