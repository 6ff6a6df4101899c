//! Hark: the turn-taking loop of a voice assistant.
//!
//! The loop decides when to speak queued notifications, when to listen for
//! the wake phrase, when to capture a command and where to send the text:
//!
//! quiet-hours check → notifications → mode signals → passive listen →
//! before-listen hooks → active listen → after-listen hooks → dispatch
//!
//! # Architecture
//!
//! - [`quiet_hours`]: pure policy deciding whether notifications may be spoken
//! - [`plugin`]: ordered listen hooks with failure isolation
//! - [`listen`]: one wake → capture → dispatch round
//! - [`conversation`]: the unbounded loop composing the above
//!
//! Speech recognition, synthesis, reasoning and notification storage are
//! collaborators behind the traits in [`collaborators`] and [`notification`].

pub mod collaborators;
pub mod config;
pub mod console;
pub mod conversation;
pub mod error;
pub mod filler;
pub mod listen;
pub mod notification;
pub mod plugin;
pub mod quiet_hours;
pub mod session;
pub mod state;

pub use collaborators::{
    Brain, ListenResult, Messenger, MetricsSink, Microphone, StatusIndicator,
};
pub use config::{ConversationConfig, HarkConfig, QuietHoursConfig};
pub use conversation::ConversationLoop;
pub use error::{HarkError, PluginError, Result};
pub use listen::{CycleOutcome, Dispatch, ListenCycle, ListenPhase};
pub use notification::{Notification, NotificationQueue, NotificationSource};
pub use plugin::{HookContext, HookOutcome, HookPoint, ListenPlugin, PluginRegistry};
pub use session::Session;
pub use state::{ConversationState, LoopMode, MicSignal, SignalSender};
