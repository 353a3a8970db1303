//! Per-host storage for hook handler queues and the init-handler list.

use crate::error::HookError;
use crate::handler::{HookHandler, InitFn};
use dashmap::DashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Owns one ordered handler queue per hook name plus the separate list of
/// plugin init routines.
///
/// Queues are created empty at host construction, before any hook slot is
/// wrapped, and grow only by appending. Dispatch reads a snapshot clone of
/// a queue, so handlers registered while a dispatch is in flight are not
/// observed by it.
pub struct HookRegistry {
    queues: DashMap<String, Vec<Arc<dyn HookHandler>>>,
    init_queue: RwLock<Vec<InitFn>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            queues: DashMap::new(),
            init_queue: RwLock::new(Vec::new()),
        }
    }

    /// (Re)initializes the queue for `name` to empty.
    ///
    /// Called once per hook name at host construction. Calling it again
    /// replaces the queue and drops every handler registered so far — do
    /// not call it after plugins have registered unless that reset is
    /// intended.
    pub fn new_queue(&self, name: &str) {
        self.queues.insert(name.to_string(), Vec::new());
    }

    /// Appends `handler` to the end of the queue for `name`.
    pub fn push(&self, name: &str, handler: Arc<dyn HookHandler>) -> Result<(), HookError> {
        let mut queue = self
            .queues
            .get_mut(name)
            .ok_or_else(|| HookError::MissingQueue(name.to_string()))?;
        debug!("registered handler '{}' for hook '{}'", handler.name(), name);
        queue.push(handler);
        Ok(())
    }

    /// Snapshot clone of the queue for `name`, if one was ever created.
    pub fn queue(&self, name: &str) -> Option<Vec<Arc<dyn HookHandler>>> {
        self.queues.get(name).map(|entry| entry.value().clone())
    }

    pub fn has_queue(&self, name: &str) -> bool {
        self.queues.contains_key(name)
    }

    pub fn push_init(&self, init: InitFn) {
        self.init_queue.write().unwrap().push(init);
    }

    /// Snapshot clone of the init-handler list (always present, possibly
    /// empty).
    pub fn init_queue(&self) -> Vec<InitFn> {
        self.init_queue.read().unwrap().clone()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
