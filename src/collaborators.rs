//! Contracts for everything the loop calls but does not own.
//!
//! The loop issues one call at a time and awaits it before moving on, so
//! implementations are free to block internally until their own timeouts.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Outcome of a passive (wake phrase) listen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListenResult {
    /// Detection score reported by the spotter.
    pub threshold: Option<f32>,
    /// What the spotter heard.
    pub transcript: Option<String>,
}

impl ListenResult {
    /// Nothing detected.
    pub fn nothing() -> Self {
        Self::default()
    }

    /// Wake phrase detected with `threshold`, having heard `transcript`.
    pub fn detected(threshold: f32, transcript: impl Into<String>) -> Self {
        Self {
            threshold: Some(threshold),
            transcript: Some(transcript.into()),
        }
    }

    /// A wake counts only with a non-zero threshold and a non-empty transcript.
    pub fn is_wake(&self) -> bool {
        let heard = self.transcript.as_deref().is_some_and(|t| !t.is_empty());
        let scored = self.threshold.is_some_and(|t| t != 0.0);
        heard && scored
    }
}

/// Audio device: wake-phrase spotting, utterance capture and speech output.
#[async_trait]
pub trait Microphone: Send + Sync {
    /// Block until the wake phrase is heard or the attempt gives up.
    async fn passive_listen(&self, persona: &str) -> Result<ListenResult>;

    /// Capture one full utterance.
    async fn active_listen(&self) -> Result<()>;

    /// Text of the utterance captured by the last [`Microphone::active_listen`].
    async fn text_from_listen(&self) -> Result<Option<String>>;

    /// Vocalize `text`, returning once playback finished.
    async fn say(&self, text: &str) -> Result<()>;
}

/// Optional external messaging channel forwarded to plugins and the brain.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Deliver a text message through the channel.
    async fn send_text(&self, text: &str) -> Result<()>;
}

/// Query / reasoning engine receiving the user's utterance.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Handle `text`. Any spoken reply is the engine's own business.
    async fn query(&self, text: &str, messenger: Option<&dyn Messenger>) -> Result<()>;
}

/// Visual / audible status cue.
pub trait StatusIndicator: Send + Sync {
    /// Wake phrase detected.
    fn wakeup(&self);
    /// Utterance captured, working on it.
    fn think(&self);
    /// Back to idle.
    fn off(&self);
}

/// Counter sink for usage metrics.
pub trait MetricsSink: Send + Sync {
    /// Add `count` successful wake events.
    fn report(&self, count: u64);
}

/// Indicator that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogIndicator;

impl StatusIndicator for LogIndicator {
    fn wakeup(&self) {
        debug!(cue = "wakeup", "status indicator");
    }

    fn think(&self) {
        debug!(cue = "think", "status indicator");
    }

    fn off(&self) {
        debug!(cue = "off", "status indicator");
    }
}

/// Indicator that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndicator;

impl StatusIndicator for NoopIndicator {
    fn wakeup(&self) {}
    fn think(&self) {}
    fn off(&self) {}
}

/// In-process wake counter.
#[derive(Debug, Default)]
pub struct WakeCounter {
    total: AtomicU64,
}

impl WakeCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total reported so far.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl MetricsSink for WakeCounter {
    fn report(&self, count: u64) {
        self.total.fetch_add(count, Ordering::Relaxed);
    }
}

/// Metrics sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn report(&self, _count: u64) {}
}
