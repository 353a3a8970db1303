//! Application-facing plugin registration for the hook system.
//!
//! Plugins hand the host a [`PluginContent`]: an ordered mapping from key to
//! either a hook handler (for declared lifecycle names) or an arbitrary JSON
//! value (custom fields), plus optional init routines. [`merge_content`]
//! routes hook entries into the host's handler queues and copies everything
//! else into the host's custom-fields store, rejecting keys that would
//! shadow a host member.

use hook_system::{HookError, HookHandler, HostConfig, PluggableHost};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

// ============================================================================
// Plugin Content
// ============================================================================

/// One entry of plugin content: a hook handler or a plain value.
pub enum PluginEntry {
    Handler(Arc<dyn HookHandler>),
    Value(Value),
}

/// Plugin-supplied init routine, run synchronously on every launch dispatch.
pub type PluginInit = Arc<dyn Fn(&PluggableHost) -> Result<(), HookError> + Send + Sync>;

/// The content a plugin registers with the host, in insertion order.
///
/// Built fluently:
///
/// ```rust,no_run
/// use plugin_host::PluginContent;
/// use hook_system::FnHandler;
/// use serde_json::json;
///
/// let content = PluginContent::named("greeter", "1.0.0")
///     .hook("on_launch", FnHandler::arc("greet", |_host, _args| {
///         Box::pin(async move { Ok(json!("hi")) })
///     }))
///     .field("greeting", json!("hi"));
/// ```
#[derive(Default)]
pub struct PluginContent {
    name: Option<String>,
    version: Option<String>,
    entries: Vec<(String, PluginEntry)>,
    inits: Vec<PluginInit>,
}

impl PluginContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content carrying plugin metadata for the host's plugin ledger.
    pub fn named(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    /// Attaches a handler under `key`. Only keys matching a declared hook
    /// name are routed to a queue at merge time.
    pub fn hook(mut self, key: impl Into<String>, handler: Arc<dyn HookHandler>) -> Self {
        self.entries.push((key.into(), PluginEntry::Handler(handler)));
        self
    }

    /// Attaches an arbitrary value under `key`.
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.push((key.into(), PluginEntry::Value(value)));
        self
    }

    /// Attaches an init routine, drained synchronously before the launch
    /// hook's own queue on every launch dispatch.
    pub fn init<F>(mut self, init: F) -> Self
    where
        F: Fn(&PluggableHost) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.inits.push(Arc::new(init));
        self
    }
}

/// Metadata recorded for each merged plugin content.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    /// Hook handlers routed into queues by this content.
    pub handler_count: usize,
}

// ============================================================================
// Plugin Merger
// ============================================================================

/// Merges `content` into `host`, in entry insertion order:
///
/// - a declared hook name with a handler is appended to that hook's queue;
/// - a declared hook name with a plain value is silently ignored (kept
///   permissive, matching long-standing behavior);
/// - any other key becomes a custom field, unless the host already owns a
///   member under that name — then the merge fails with
///   [`HookError::ProtectedMember`] and construction must abort.
///
/// Init routines are appended to the host's init-handler list.
pub fn merge_content(
    host: &PluggableHost,
    content: PluginContent,
) -> Result<PluginInfo, HookError> {
    let mut handler_count = 0;

    for (key, entry) in content.entries {
        let is_hook = host.hook_names().iter().any(|name| name == &key);
        match entry {
            PluginEntry::Handler(handler) if is_hook => {
                host.push_hook_fun(&key, handler)?;
                handler_count += 1;
            }
            PluginEntry::Value(_) if is_hook => {
                // Non-callable content under a hook key is dropped, not an
                // error.
                debug!("ignoring non-handler value under hook key '{}'", key);
            }
            PluginEntry::Handler(_) => {
                warn!(
                    "ignoring handler under undeclared hook key '{}' (declared hooks: {:?})",
                    key,
                    host.hook_names()
                );
            }
            PluginEntry::Value(value) => {
                host.set_field(&key, value)?;
            }
        }
    }

    for init in content.inits {
        host.push_init_fun(move |host| init(host));
    }

    Ok(PluginInfo {
        name: content.name.unwrap_or_else(|| "anonymous".to_string()),
        version: content.version.unwrap_or_else(|| "0.0.0".to_string()),
        handler_count,
    })
}

// ============================================================================
// Lifecycle App
// ============================================================================

/// Default lifecycle hook set. The first entry is the launch hook.
///
/// `on_error` is deliberately absent: the error channel must never be
/// wrapped, since a failing error dispatch would re-trigger itself.
pub const NATIVE_HOOKS: &[&str] = &["on_launch", "on_show", "on_hide", "on_page_not_found"];

/// A host preconfigured with the default lifecycle hooks, merging plugin
/// content exactly once at construction.
///
/// Dereferences to [`PluggableHost`] for dispatch and registration.
pub struct LifecycleApp {
    host: PluggableHost,
    plugins: RwLock<Vec<PluginInfo>>,
}

impl LifecycleApp {
    /// An app with no plugin content.
    pub fn new() -> Self {
        Self {
            host: PluggableHost::new(HostConfig::new(NATIVE_HOOKS.iter().copied())),
            plugins: RwLock::new(Vec::new()),
        }
    }

    /// An app with one plugin content merged during construction. A merge
    /// failure aborts construction; no partially built app is returned.
    pub fn with_content(content: PluginContent) -> Result<Self, HookError> {
        let app = Self::new();
        let info = merge_content(&app.host, content)?;
        debug!(
            "merged plugin '{}' v{} ({} handler(s))",
            info.name, info.version, info.handler_count
        );
        app.plugins.write().unwrap().push(info);
        Ok(app)
    }

    /// Several plugin contents, merged in order during construction.
    pub fn with_contents(
        contents: impl IntoIterator<Item = PluginContent>,
    ) -> Result<Self, HookError> {
        let app = Self::new();
        for content in contents {
            let info = merge_content(&app.host, content)?;
            app.plugins.write().unwrap().push(info);
        }
        Ok(app)
    }

    pub fn host(&self) -> &PluggableHost {
        &self.host
    }

    /// Merged plugin metadata, in merge order.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.plugins.read().unwrap().clone()
    }
}

impl Default for LifecycleApp {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for LifecycleApp {
    type Target = PluggableHost;

    fn deref(&self) -> &PluggableHost {
        &self.host
    }
}
