//! Per-session mode state and the signal channel that drives it.
//!
//! The microphone side never touches the flags directly: it sends
//! [`MicSignal`]s, and the loop folds whatever arrived into its
//! [`ConversationState`] at the top of each iteration.

use crate::error::{HarkError, Result};
use tokio::sync::mpsc;

/// Mode change requested by the microphone collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicSignal {
    /// Pause wake-phrase detection until [`MicSignal::Resume`].
    StopForNow,
    /// Undo [`MicSignal::StopForNow`].
    Resume,
    /// Skip passive listening on the next iteration.
    SkipPassiveOnce,
    /// Enter multi-turn chatting; the skip flag persists while chatting.
    EnterChatting,
    /// Leave chatting mode.
    LeaveChatting,
}

/// Cloneable handle used by the microphone side to send [`MicSignal`]s.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<MicSignal>,
}

impl SignalSender {
    /// Queue `signal` for the next iteration.
    ///
    /// # Errors
    ///
    /// Returns [`HarkError::Channel`] once the loop has been dropped.
    pub fn send(&self, signal: MicSignal) -> Result<()> {
        self.tx
            .send(signal)
            .map_err(|e| HarkError::Channel(format!("conversation loop gone: {e}")))
    }
}

/// Create a signal channel.
pub fn signal_channel() -> (SignalSender, mpsc::UnboundedReceiver<MicSignal>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSender { tx }, rx)
}

/// What the next iteration will do before any listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Back off without listening.
    Stopped,
    /// Skip passive listening this iteration.
    SkipOnce,
    /// Listen for the wake phrase.
    Listening,
}

/// Mutable per-session record owned by the conversation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    persona: String,
    /// Microphone asked us to stop listening for now.
    pub stopped_for_now: bool,
    /// Skip passive listening on the next iteration.
    pub skip_passive_listening: bool,
    /// Multi-turn exchange in progress.
    pub chatting_mode: bool,
}

impl ConversationState {
    /// Fresh state listening for `persona`.
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            stopped_for_now: false,
            skip_passive_listening: false,
            chatting_mode: false,
        }
    }

    /// Wake keyword; fixed for the session.
    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Fold one signal into the flags.
    pub fn apply(&mut self, signal: MicSignal) {
        match signal {
            MicSignal::StopForNow => self.stopped_for_now = true,
            MicSignal::Resume => self.stopped_for_now = false,
            MicSignal::SkipPassiveOnce => self.skip_passive_listening = true,
            MicSignal::EnterChatting => self.chatting_mode = true,
            MicSignal::LeaveChatting => self.chatting_mode = false,
        }
    }

    /// Drain every signal already queued on `rx`, in arrival order.
    ///
    /// Returns how many were applied. Never waits.
    pub fn absorb(&mut self, rx: &mut mpsc::UnboundedReceiver<MicSignal>) -> usize {
        let mut applied = 0;
        while let Ok(signal) = rx.try_recv() {
            self.apply(signal);
            applied += 1;
        }
        applied
    }

    /// Current mode. Stopped wins over a pending skip.
    pub fn mode(&self) -> LoopMode {
        if self.stopped_for_now {
            LoopMode::Stopped
        } else if self.skip_passive_listening {
            LoopMode::SkipOnce
        } else {
            LoopMode::Listening
        }
    }

    /// Consume a skip. The flag survives while chatting.
    pub fn consume_skip(&mut self) {
        if !self.chatting_mode {
            self.skip_passive_listening = false;
        }
    }
}
