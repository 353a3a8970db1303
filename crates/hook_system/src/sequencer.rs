//! Ordered execution of asynchronous handler queues.

use crate::error::HookError;
use crate::handler::HookHandler;
use crate::host::PluggableHost;
use serde_json::Value;
use std::sync::Arc;

/// Runs `tasks` one at a time, each invoked with `host` and `args`, awaiting
/// each result before starting the next. Resolved values are collected in
/// task order.
///
/// This serializes side effects even when individual handlers suspend:
/// handler *k* settles strictly before handler *k + 1* begins.
///
/// Fail-fast: the first error aborts the chain, remaining tasks never run,
/// and values collected before the failure are discarded.
pub async fn run_sequentially(
    tasks: &[Arc<dyn HookHandler>],
    host: &PluggableHost,
    args: &[Value],
) -> Result<Vec<Value>, HookError> {
    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        results.push(task.call(host, args).await?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use crate::host::{HostConfig, PluggableHost};
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn bare_host() -> PluggableHost {
        PluggableHost::new(HostConfig::new(["on_launch"]))
    }

    fn logging_task(
        id: u64,
        delay_ms: u64,
        log: Arc<Mutex<Vec<u64>>>,
    ) -> Arc<dyn HookHandler> {
        FnHandler::arc(format!("task_{id}"), move |_host, _args| {
            let log = log.clone();
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                log.lock().unwrap().push(id);
                Ok(json!(id))
            })
        })
    }

    #[tokio::test]
    async fn empty_task_list_resolves_immediately() {
        let host = bare_host();
        let results = run_sequentially(&[], &host, &[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn tasks_run_in_order_despite_staggered_delays() {
        let host = bare_host();
        let log = Arc::new(Mutex::new(Vec::new()));

        // If anything ran concurrently, completion order would be 3, 2, 1.
        let tasks = vec![
            logging_task(1, 30, log.clone()),
            logging_task(2, 10, log.clone()),
            logging_task(3, 0, log.clone()),
        ];

        let results = run_sequentially(&tasks, &host, &[]).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(results, vec![json!(1), json!(2), json!(3)]);
    }

    #[tokio::test]
    async fn first_failure_aborts_remaining_tasks() {
        let host = bare_host();
        let log = Arc::new(Mutex::new(Vec::new()));

        let failing: Arc<dyn HookHandler> = FnHandler::arc("task_2", |_host, _args| {
            Box::pin(async move { Err(HookError::execution("test", "task_2", "boom")) })
        });
        let tasks = vec![
            logging_task(1, 0, log.clone()),
            failing,
            logging_task(3, 0, log.clone()),
        ];

        let err = run_sequentially(&tasks, &host, &[]).await.unwrap_err();
        assert!(matches!(err, HookError::HandlerExecution { .. }));
        // Task 3 never ran; task 1's partial result was discarded with the error.
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn tasks_receive_the_dispatch_arguments() {
        let host = bare_host();
        let echo: Arc<dyn HookHandler> = FnHandler::arc("echo", |_host, args| {
            let args = args.to_vec();
            Box::pin(async move { Ok(json!(args)) })
        });

        let args = vec![json!("a"), json!(2)];
        let results = run_sequentially(&[echo], &host, &args).await.unwrap();
        assert_eq!(results, vec![json!(["a", 2])]);
    }
}
