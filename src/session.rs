//! Explicit session context: every collaborator the loop talks to.

use crate::collaborators::{
    Brain, LogIndicator, Messenger, MetricsSink, Microphone, NoopMetrics, StatusIndicator,
};
use crate::config::HarkConfig;
use crate::filler::{FillerPhrases, PhraseSelector, RandomSelector};
use crate::notification::{NotificationQueue, NotificationSource};
use crate::plugin::PluginRegistry;
use crate::quiet_hours::{Clock, SystemClock};
use std::sync::Arc;

/// Collaborators and configuration for one conversation session.
///
/// Built once by the host and moved into the
/// [`ConversationLoop`](crate::conversation::ConversationLoop).
pub struct Session {
    /// Immutable configuration snapshot.
    pub config: Arc<HarkConfig>,
    /// Audio device.
    pub mic: Arc<dyn Microphone>,
    /// Query / reasoning engine.
    pub brain: Arc<dyn Brain>,
    /// Pending notifications.
    pub notifier: Arc<dyn NotificationSource>,
    /// Status cues.
    pub indicator: Arc<dyn StatusIndicator>,
    /// Wake counter.
    pub metrics: Arc<dyn MetricsSink>,
    /// Optional external messaging handle.
    pub messenger: Option<Arc<dyn Messenger>>,
    /// Listen hook plugins.
    pub plugins: PluginRegistry,
    /// Local time source for quiet hours.
    pub clock: Arc<dyn Clock>,
    /// Acknowledgments for empty input.
    pub filler: FillerPhrases,
}

impl Session {
    /// Session with the required collaborators and defaults for the rest:
    /// an empty notification queue, a logging indicator, no metrics, no
    /// messenger, no plugins, the system clock and random filler phrases
    /// from `config`.
    pub fn new(config: HarkConfig, mic: Arc<dyn Microphone>, brain: Arc<dyn Brain>) -> Self {
        let filler = FillerPhrases::new(
            config.conversation.filler_phrases.clone(),
            Box::new(RandomSelector),
        );
        Self {
            config: Arc::new(config),
            mic,
            brain,
            notifier: Arc::new(NotificationQueue::new()),
            indicator: Arc::new(LogIndicator),
            metrics: Arc::new(NoopMetrics),
            messenger: None,
            plugins: PluginRegistry::new(),
            clock: Arc::new(SystemClock),
            filler,
        }
    }

    /// Replace the notification source.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSource>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the status indicator.
    pub fn with_indicator(mut self, indicator: Arc<dyn StatusIndicator>) -> Self {
        self.indicator = indicator;
        self
    }

    /// Replace the metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Attach an external messaging handle.
    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    /// Replace the plugin registry.
    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Keep the configured phrases but pick them with `selector`.
    pub fn with_phrase_selector(mut self, selector: Box<dyn PhraseSelector>) -> Self {
        self.filler = FillerPhrases::new(self.filler.all().to_vec(), selector);
        self
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("messenger", &self.messenger.as_ref().map(|m| m.name().to_owned()))
            .field("plugins", &self.plugins)
            .field("filler", &self.filler)
            .finish_non_exhaustive()
    }
}
