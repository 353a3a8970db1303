//! The pluggable host: declared hook names, queues, slots, custom fields.

use crate::error::HookError;
use crate::handler::{ErrorSink, HookHandler, InitFn};
use crate::pluggable::{pluggablify, BeforeCall, HookSlot};
use crate::registry::HookRegistry;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};

/// Default name of the error hook. Never wrapped (see
/// [`pluggablify`](crate::pluggable::pluggablify)).
pub const DEFAULT_ERROR_HOOK: &str = "on_error";

/// Host member names that plugin content may never overwrite.
pub const RESERVED_MEMBERS: &[&str] = &[
    "push_hook_fun",
    "get_hook_fun_queue",
    "new_hook_fun_queue",
    "push_init_fun",
    "get_init_fun_queue",
    "dispatch",
    "set_on_error",
    "on_error",
    "set_field",
    "field",
    "has_member",
    "stats",
    "hook_names",
    "launch_hook",
    "is_pluggable",
    "dispatcher",
];

/// Dispatch statistics, updated by the dispatcher and readable at any time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HookStats {
    pub dispatches: u64,
    pub handlers_invoked: u64,
    pub handler_failures: u64,
    pub init_runs: u64,
}

/// Construction parameters for a [`PluggableHost`].
///
/// `hook_names` is the fixed, ordered set of lifecycle points; the first
/// name is the launch hook unless `launch_hook` overrides it.
pub struct HostConfig {
    pub hook_names: Vec<String>,
    pub launch_hook: Option<String>,
    pub error_hook: String,
}

impl HostConfig {
    pub fn new<I, S>(hook_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hook_names: hook_names.into_iter().map(Into::into).collect(),
            launch_hook: None,
            error_hook: DEFAULT_ERROR_HOOK.to_string(),
        }
    }

    pub fn with_launch_hook(mut self, name: impl Into<String>) -> Self {
        self.launch_hook = Some(name.into());
        self
    }
}

/// A host with a declared set of pluggable lifecycle hooks.
///
/// Each declared hook owns one handler queue, created empty at construction
/// before its slot is wrapped. The launch hook's dispatcher additionally
/// drains the init-handler list synchronously, in order, on every
/// invocation, before any queued handler runs.
///
/// Registration is intended to finish before dispatch begins; a dispatch
/// reads a snapshot of the queue, so handlers pushed mid-dispatch are not
/// observed by it (known sharp edge, not guarded).
pub struct PluggableHost {
    hook_names: Vec<String>,
    launch_hook: String,
    error_hook: String,
    registry: HookRegistry,
    slots: DashMap<String, Arc<HookSlot>>,
    fields: DashMap<String, Value>,
    on_error: RwLock<Option<ErrorSink>>,
    stats: RwLock<HookStats>,
}

impl PluggableHost {
    /// Builds the registry and wraps every declared hook slot, giving the
    /// launch hook its init-draining before-call.
    pub fn new(config: HostConfig) -> Self {
        let launch_hook = config
            .launch_hook
            .unwrap_or_else(|| config.hook_names.first().cloned().unwrap_or_default());

        let host = Self {
            hook_names: config.hook_names,
            launch_hook,
            error_hook: config.error_hook,
            registry: HookRegistry::new(),
            slots: DashMap::new(),
            fields: DashMap::new(),
            on_error: RwLock::new(None),
            stats: RwLock::new(HookStats::default()),
        };

        for name in host.hook_names.clone() {
            if name == host.launch_hook {
                let hook = name.clone();
                let before: BeforeCall = Arc::new(move |host: &PluggableHost| {
                    for init in host.get_init_fun_queue() {
                        init(host).map_err(|err| HookError::BeforeCall {
                            hook: hook.clone(),
                            message: err.to_string(),
                        })?;
                        host.stats.write().unwrap().init_runs += 1;
                    }
                    Ok(())
                });
                pluggablify(&host, &name, Some(before));
            } else {
                pluggablify(&host, &name, None);
            }
        }

        host
    }

    /// Dispatches `name`: runs the slot's before-call (launch hook only),
    /// then drains the handler queue in registration order, one handler at
    /// a time. Handler errors reach the error sink once and are then
    /// returned; before-call errors bypass the sink entirely.
    pub async fn dispatch(&self, name: &str, args: &[Value]) -> Result<Vec<Value>, HookError> {
        let slot = self
            .slots
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| HookError::MissingQueue(name.to_string()))?;
        slot.dispatch(self, args).await
    }

    /// Appends a handler to the end of `name`'s queue.
    pub fn push_hook_fun(
        &self,
        name: &str,
        handler: Arc<dyn HookHandler>,
    ) -> Result<(), HookError> {
        self.registry.push(name, handler)
    }

    /// Snapshot of `name`'s queue, if it was ever created.
    pub fn get_hook_fun_queue(&self, name: &str) -> Option<Vec<Arc<dyn HookHandler>>> {
        self.registry.queue(name)
    }

    /// (Re)creates `name`'s queue as empty, dropping registered handlers.
    pub fn new_hook_fun_queue(&self, name: &str) {
        self.registry.new_queue(name);
    }

    /// Appends a plugin init routine, run synchronously on every launch
    /// dispatch.
    pub fn push_init_fun<F>(&self, init: F)
    where
        F: Fn(&PluggableHost) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.registry.push_init(Arc::new(init) as InitFn);
    }

    pub fn get_init_fun_queue(&self) -> Vec<InitFn> {
        self.registry.init_queue()
    }

    /// Installs the error sink notified of dispatch-time handler failures.
    pub fn set_on_error<F>(&self, sink: F)
    where
        F: Fn(&HookError) + Send + Sync + 'static,
    {
        *self.on_error.write().unwrap() = Some(Arc::new(sink) as ErrorSink);
    }

    /// Stores a custom plugin field unless the key names a host member.
    pub fn set_field(&self, key: &str, value: Value) -> Result<(), HookError> {
        if self.has_member(key) {
            return Err(HookError::ProtectedMember(key.to_string()));
        }
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<Value> {
        self.fields.get(key).map(|entry| entry.value().clone())
    }

    /// True if `key` names anything the host already owns: a reserved
    /// operation, a wrapped hook slot, or a previously merged field.
    pub fn has_member(&self, key: &str) -> bool {
        RESERVED_MEMBERS.contains(&key)
            || self.slots.contains_key(key)
            || self.fields.contains_key(key)
    }

    pub fn hook_names(&self) -> &[String] {
        &self.hook_names
    }

    pub fn launch_hook(&self) -> &str {
        &self.launch_hook
    }

    pub fn error_hook(&self) -> &str {
        &self.error_hook
    }

    pub fn is_pluggable(&self, name: &str) -> bool {
        self.dispatcher(name)
            .map(|slot| slot.is_pluggable())
            .unwrap_or(false)
    }

    /// The slot handle for `name`; stable for the host's lifetime.
    pub fn dispatcher(&self, name: &str) -> Option<Arc<HookSlot>> {
        self.slots.get(name).map(|entry| entry.value().clone())
    }

    pub fn stats(&self) -> HookStats {
        self.stats.read().unwrap().clone()
    }

    pub(crate) fn install_slot(&self, slot: Arc<HookSlot>) {
        self.slots.insert(slot.name().to_string(), slot);
    }

    pub(crate) fn error_sink(&self) -> Option<ErrorSink> {
        self.on_error.read().unwrap().clone()
    }

    pub(crate) fn record_dispatch(&self, handlers: u64) {
        let mut stats = self.stats.write().unwrap();
        stats.dispatches += 1;
        stats.handlers_invoked += handlers;
    }

    pub(crate) fn record_failed_dispatch(&self) {
        let mut stats = self.stats.write().unwrap();
        stats.dispatches += 1;
        stats.handler_failures += 1;
    }
}

impl std::fmt::Debug for PluggableHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluggableHost")
            .field("hook_names", &self.hook_names)
            .field("launch_hook", &self.launch_hook)
            .field("slots", &self.slots.len())
            .field("fields", &self.fields.len())
            .finish()
    }
}
