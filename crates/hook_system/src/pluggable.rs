//! Hook slot wrapping ("pluggablification") and per-slot dispatch.
//!
//! A wrapped hook is modeled as an explicit [`HookSlot`] record stored in
//! the host's slot map, with the "already wrapped" marker as a plain boolean
//! field. No method slot is ever replaced dynamically; dispatch always goes
//! through [`PluggableHost::dispatch`](crate::host::PluggableHost::dispatch).

use crate::error::HookError;
use crate::host::PluggableHost;
use crate::sequencer::run_sequentially;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Side effect run synchronously before a slot's queue is sequenced.
/// Used only by the launch hook to drain the init-handler list.
pub type BeforeCall = Arc<dyn Fn(&PluggableHost) -> Result<(), HookError> + Send + Sync>;

/// A wrapped hook slot: the dispatcher installed in place of a plain
/// lifecycle method. Slot identity is stable for the host's lifetime.
pub struct HookSlot {
    name: String,
    /// Marker guarding against double wrapping (and with it, infinite
    /// recursive dispatch).
    pluggable: bool,
    before_call: Option<BeforeCall>,
}

impl HookSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_pluggable(&self) -> bool {
        self.pluggable
    }

    /// Drains this slot's queue in registration order.
    ///
    /// The `before_call` side effect runs first and its errors return
    /// immediately, bypassing the error sink. Handler errors are forwarded
    /// to the host's error sink once, then returned unchanged.
    pub(crate) async fn dispatch(
        &self,
        host: &PluggableHost,
        args: &[Value],
    ) -> Result<Vec<Value>, HookError> {
        if let Some(before) = &self.before_call {
            before(host)?;
        }

        // A slot whose queue was never created dispatches as empty.
        let Some(queue) = host.get_hook_fun_queue(&self.name) else {
            return Ok(Vec::new());
        };

        debug!("dispatching '{}' to {} handler(s)", self.name, queue.len());
        match run_sequentially(&queue, host, args).await {
            Ok(results) => {
                host.record_dispatch(queue.len() as u64);
                Ok(results)
            }
            Err(err) => {
                host.record_failed_dispatch();
                error!("hook '{}' dispatch failed: {}", self.name, err);
                if let Some(sink) = host.error_sink() {
                    sink(&err);
                }
                Err(err)
            }
        }
    }
}

/// Wraps `host`'s hook slot `name` with a queue-draining dispatcher.
///
/// Idempotent: a slot that already carries the pluggable marker is left
/// untouched (warning only), preserving both the dispatcher identity and
/// the handlers registered so far. The host's error hook is refused
/// outright — wrapping it would recurse when error dispatch itself fails.
pub fn pluggablify(host: &PluggableHost, name: &str, before_call: Option<BeforeCall>) {
    if name == host.error_hook() {
        warn!(
            "refusing to pluggablify error hook '{}': a failing error dispatch would recurse",
            name
        );
        return;
    }

    if let Some(slot) = host.dispatcher(name) {
        if slot.is_pluggable() {
            warn!(
                "hook '{}' has already been pluggablified, repeated wrapping is not allowed",
                name
            );
            return;
        }
    }

    host.new_hook_fun_queue(name);
    host.install_slot(Arc::new(HookSlot {
        name: name.to_string(),
        pluggable: true,
        before_call,
    }));
}
