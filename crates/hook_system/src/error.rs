//! Error taxonomy for hook registration and dispatch.

/// Errors that can occur while registering handlers or dispatching hooks.
///
/// Registration-time errors ([`MissingQueue`](HookError::MissingQueue),
/// [`ProtectedMember`](HookError::ProtectedMember)) indicate misconfiguration
/// and should abort setup. Dispatch-time errors are forwarded once to the
/// host's error sink and then returned to the dispatch caller — the system
/// never decides on behalf of the caller whether a handler failure is fatal.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// A handler was pushed for a hook name whose queue was never created.
    #[error("no handler queue exists for hook '{0}'")]
    MissingQueue(String),

    /// Plugin content tried to overwrite an existing host member.
    #[error("cannot overwrite protected host member '{0}'")]
    ProtectedMember(String),

    /// A registered handler failed during dispatch.
    #[error("handler '{handler}' failed during '{hook}' dispatch: {message}")]
    HandlerExecution {
        hook: String,
        handler: String,
        message: String,
    },

    /// An init handler failed during the synchronous pre-dispatch drain of
    /// the launch hook. This path bypasses the error sink entirely.
    #[error("init handler failed before '{hook}' dispatch: {message}")]
    BeforeCall { hook: String, message: String },
}

impl HookError {
    /// Shorthand for a handler failure raised from inside a handler body.
    pub fn execution(hook: &str, handler: &str, message: impl Into<String>) -> Self {
        Self::HandlerExecution {
            hook: hook.to_string(),
            handler: handler.to_string(),
            message: message.into(),
        }
    }
}
