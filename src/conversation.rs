//! The top-level conversation loop.
//!
//! Each iteration: speak queued notifications when quiet hours allow, fold
//! pending microphone signals into the mode flags, then run one
//! [`ListenCycle`]. The loop never ends on its own; it returns only when a
//! collaborator fails fatally.

use crate::error::Result;
use crate::listen::{CycleOutcome, ListenCycle};
use crate::session::Session;
use crate::state::{ConversationState, MicSignal, SignalSender, signal_channel};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Owns the session, its mode state and the receiving end of the signal channel.
pub struct ConversationLoop {
    session: Session,
    state: ConversationState,
    signals: mpsc::UnboundedReceiver<MicSignal>,
    signal_tx: SignalSender,
}

impl ConversationLoop {
    /// Create a loop listening for the configured persona.
    pub fn new(session: Session) -> Self {
        let state = ConversationState::new(session.config.conversation.persona.clone());
        let (signal_tx, signals) = signal_channel();
        Self {
            session,
            state,
            signals,
            signal_tx,
        }
    }

    /// Handle for the microphone side to change modes.
    pub fn signal_sender(&self) -> SignalSender {
        self.signal_tx.clone()
    }

    /// Mode state as of the last iteration.
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// The session this loop runs.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Speak every queued notification, oldest first, if quiet hours allow.
    ///
    /// Returns how many were spoken.
    ///
    /// # Errors
    ///
    /// Notifier and speech failures propagate.
    pub async fn speak_notifications(&self) -> Result<usize> {
        let hour = self.session.clock.local_hour();
        let quiet = self.session.config.do_not_bother.as_ref();
        if !crate::quiet_hours::is_proper_time(quiet, hour) {
            debug!(hour, "quiet hours, holding notifications");
            return Ok(0);
        }

        let notifications = self.session.notifier.take_all().await?;
        for notification in &notifications {
            info!("received notification: '{notification}'");
            self.session.mic.say(&notification.to_string()).await?;
        }
        Ok(notifications.len())
    }

    /// Run exactly one iteration.
    ///
    /// # Errors
    ///
    /// Any collaborator failure outside plugin hooks.
    pub async fn run_iteration(&mut self) -> Result<CycleOutcome> {
        self.speak_notifications().await?;

        let applied = self.state.absorb(&mut self.signals);
        if applied > 0 {
            debug!(applied, mode = ?self.state.mode(), "mic signals applied");
        }

        ListenCycle::new(&self.session).run(&mut self.state).await
    }

    /// Run iterations until a collaborator fails.
    ///
    /// # Errors
    ///
    /// This only ever returns the fatal error that ended the loop.
    pub async fn handle_forever(&mut self) -> Result<Infallible> {
        info!(
            persona = self.state.persona(),
            "starting to handle conversation with keyword '{}'",
            self.state.persona()
        );
        loop {
            self.run_iteration().await?;
        }
    }
}

impl std::fmt::Debug for ConversationLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationLoop")
            .field("session", &self.session)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
