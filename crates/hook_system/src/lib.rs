//! # Hook System
//!
//! A pluggable lifecycle hook system: a host declares a fixed, ordered set
//! of named lifecycle points, independently authored plugins attach
//! handlers to those points, and each dispatch fans out to every registered
//! handler in registration order.
//!
//! ## Key properties
//!
//! - **Ordered dispatch**: handlers run one at a time, each awaited before
//!   the next starts, even when individual handlers are asynchronous
//! - **Idempotent wrapping**: a hook slot is pluggablified at most once per
//!   host; repeated attempts warn and leave the slot untouched
//! - **Fail-fast sequencing**: the first handler error aborts the chain and
//!   discards partial results
//! - **Single error channel**: handler failures are forwarded once to the
//!   host's `on_error` sink, then returned to the dispatch caller
//! - **Launch synchronization**: the launch hook drains the plugin
//!   init-handler list synchronously before its own queue runs
//!
//! ## Example
//!
//! ```rust,no_run
//! use hook_system::{FnHandler, HostConfig, PluggableHost};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hook_system::HookError> {
//!     let host = PluggableHost::new(HostConfig::new(["on_launch", "on_show"]));
//!
//!     host.push_hook_fun(
//!         "on_show",
//!         FnHandler::arc("greeter", |_host, _args| {
//!             Box::pin(async move { Ok(json!("hello")) })
//!         }),
//!     )?;
//!
//!     let results = host.dispatch("on_show", &[json!({"page": "index"})]).await?;
//!     assert_eq!(results, vec![json!("hello")]);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handler;
pub mod host;
pub mod pluggable;
pub mod registry;
pub mod sequencer;

pub use error::HookError;
pub use handler::{ErrorSink, FnHandler, HandlerFuture, HookHandler, InitFn};
pub use host::{HookStats, HostConfig, PluggableHost, DEFAULT_ERROR_HOOK, RESERVED_MEMBERS};
pub use pluggable::{pluggablify, BeforeCall, HookSlot};
pub use registry::HookRegistry;
pub use sequencer::run_sequentially;

/// Result type used throughout the system.
pub type Result<T> = std::result::Result<T, HookError>;
