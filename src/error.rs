//! Error types for the conversation loop.

/// Top-level error type for the conversation loop and its collaborators.
///
/// Every variant except those raised inside plugin hooks is fatal to
/// [`ConversationLoop::handle_forever`](crate::conversation::ConversationLoop::handle_forever).
#[derive(Debug, thiserror::Error)]
pub enum HarkError {
    /// Microphone / audio path failure (capture, passive or active listen).
    #[error("audio error: {0}")]
    Audio(String),

    /// Text-to-speech failure while vocalizing.
    #[error("speech error: {0}")]
    Speech(String),

    /// Query / reasoning engine failure.
    #[error("brain error: {0}")]
    Brain(String),

    /// Notification source failure.
    #[error("notifier error: {0}")]
    Notifier(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HarkError>;

/// Errors a plugin hook may raise.
///
/// None of these escape the hook pipeline: each one is logged and turns the
/// invocation into a stop.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The plugin reported a failure of its own.
    #[error("plugin failed: {reason}")]
    Failed {
        /// Why the plugin failed.
        reason: String,
    },

    /// The plugin panicked while running its hook.
    #[error("plugin panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },

    /// A collaborator called from inside the hook failed.
    #[error(transparent)]
    Collaborator(#[from] HarkError),
}

impl PluginError {
    /// Shorthand for [`PluginError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
