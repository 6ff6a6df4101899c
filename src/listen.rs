//! One wake → capture → dispatch round.

use crate::error::Result;
use crate::plugin::{HookContext, HookPoint};
use crate::session::Session;
use crate::state::{ConversationState, LoopMode};
use std::time::Duration;
use tracing::{debug, info};

/// Phases a listen cycle moves through. Every cycle ends back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenPhase {
    /// Between cycles.
    Idle,
    /// Waiting for the wake phrase.
    PassiveListening,
    /// Capturing the utterance (hooks included).
    ActiveListening,
    /// Handing the utterance off.
    Dispatching,
}

/// What was done with the captured utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Sent verbatim to the brain.
    Query(String),
    /// Nothing captured and configured to stay quiet.
    Silent,
    /// Nothing captured; this acknowledgment was spoken.
    Filler(String),
}

/// How one iteration ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Microphone asked us to stop; backed off without listening.
    Stopped,
    /// Passive listening skipped this iteration.
    SkippedPassive,
    /// Passive listening ended without the wake phrase.
    NothingHeard,
    /// Full round completed.
    Dispatched(Dispatch),
}

/// A single listen round over a session.
pub struct ListenCycle<'a> {
    session: &'a Session,
    phase: ListenPhase,
}

impl<'a> ListenCycle<'a> {
    /// Start a cycle in [`ListenPhase::Idle`].
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            phase: ListenPhase::Idle,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ListenPhase {
        self.phase
    }

    /// Run the round against `state`.
    ///
    /// # Errors
    ///
    /// Microphone and brain failures propagate unchanged. Plugin failures
    /// never do.
    pub async fn run(&mut self, state: &mut ConversationState) -> Result<CycleOutcome> {
        match state.mode() {
            LoopMode::Stopped => {
                info!("skip conversation for now");
                let backoff = self.session.config.conversation.stopped_backoff_ms;
                tokio::time::sleep(Duration::from_millis(backoff)).await;
                return Ok(CycleOutcome::Stopped);
            }
            LoopMode::SkipOnce => {
                debug!(chatting = state.chatting_mode, "skip passive listening");
                state.consume_skip();
                // Nothing else here suspends; let the signal sender run.
                tokio::task::yield_now().await;
                return Ok(CycleOutcome::SkippedPassive);
            }
            LoopMode::Listening => {}
        }

        let session = self.session;
        let persona = state.persona();

        self.enter(ListenPhase::PassiveListening);
        debug!(persona, "started listening for keyword");
        let heard = session.mic.passive_listen(persona).await?;
        debug!(persona, "stopped listening for keyword");

        if !heard.is_wake() {
            info!("nothing has been said or transcribed");
            self.enter(ListenPhase::Idle);
            return Ok(CycleOutcome::NothingHeard);
        }
        info!(persona, "keyword has been said");

        session.indicator.wakeup();
        session.metrics.report(1);

        self.enter(ListenPhase::ActiveListening);
        debug!(threshold = ?heard.threshold, "started to listen actively");
        let ctx = HookContext {
            mic: session.mic.as_ref(),
            config: session.config.as_ref(),
            messenger: session.messenger.as_deref(),
            threshold: heard.threshold,
        };

        session.plugins.run(HookPoint::BeforeListen, &ctx).await;
        session.mic.active_listen().await?;
        session.indicator.think();
        let input = session.mic.text_from_listen().await?;
        debug!(threshold = ?heard.threshold, "stopped to listen actively");
        session.plugins.run(HookPoint::AfterListen, &ctx).await;

        self.enter(ListenPhase::Dispatching);
        let dispatched = self.dispatch(input).await;
        session.indicator.off();
        let dispatch = dispatched?;

        self.enter(ListenPhase::Idle);
        Ok(CycleOutcome::Dispatched(dispatch))
    }

    async fn dispatch(&self, input: Option<String>) -> Result<Dispatch> {
        let session = self.session;
        match input.filter(|text| !text.is_empty()) {
            Some(text) => {
                session
                    .brain
                    .query(&text, session.messenger.as_deref())
                    .await?;
                Ok(Dispatch::Query(text))
            }
            None if session.config.conversation.shut_up_if_no_input => {
                info!("active listen returned empty");
                Ok(Dispatch::Silent)
            }
            None => {
                let phrase = session.filler.pick().to_owned();
                session.mic.say(&phrase).await?;
                Ok(Dispatch::Filler(phrase))
            }
        }
    }

    fn enter(&mut self, next: ListenPhase) {
        debug!(from = ?self.phase, to = ?next, "listen phase");
        self.phase = next;
    }
}
