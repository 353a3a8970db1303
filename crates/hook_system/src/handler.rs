//! Handler traits and adapters.
//!
//! Queued hook handlers are trait objects so that plugins written against
//! different closure shapes can share one queue. Every handler is invoked
//! with an explicit reference to its owning host plus the dispatch argument
//! slice — there is no implicit receiver.

use crate::error::HookError;
use crate::host::PluggableHost;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

/// Future type produced by closure-backed handlers.
pub type HandlerFuture<'a> = BoxFuture<'a, Result<Value, HookError>>;

/// A plugin-supplied init routine, run synchronously before the launch
/// hook's queue (never queued, never awaited).
pub type InitFn = Arc<dyn Fn(&PluggableHost) -> Result<(), HookError> + Send + Sync>;

/// The host's error sink. Receives a borrow of each dispatch-time handler
/// error before that error is returned to the dispatch caller.
pub type ErrorSink = Arc<dyn Fn(&HookError) + Send + Sync>;

/// A handler attached to one hook's queue.
///
/// Handlers may suspend; the dispatcher awaits each handler's result before
/// invoking the next one in the queue.
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Run the handler with the owning host and the dispatch arguments.
    async fn call(&self, host: &PluggableHost, args: &[Value]) -> Result<Value, HookError>;

    /// Handler name for diagnostics.
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Closure-backed [`HookHandler`].
///
/// The closure receives the host and argument slice and returns a boxed
/// future, so both plain and suspending handlers fit:
///
/// ```rust,no_run
/// use hook_system::FnHandler;
/// use serde_json::json;
///
/// let handler = FnHandler::new("greeter", |_host, _args| {
///     Box::pin(async move { Ok(json!("hello")) })
/// });
/// ```
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> FnHandler<F>
where
    F: for<'a> Fn(&'a PluggableHost, &'a [Value]) -> HandlerFuture<'a> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Boxed, ready to push onto a queue.
    pub fn arc(name: impl Into<String>, f: F) -> Arc<dyn HookHandler>
    where
        F: 'static,
    {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> HookHandler for FnHandler<F>
where
    F: for<'a> Fn(&'a PluggableHost, &'a [Value]) -> HandlerFuture<'a> + Send + Sync,
{
    async fn call(&self, host: &PluggableHost, args: &[Value]) -> Result<Value, HookError> {
        (self.f)(host, args).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
