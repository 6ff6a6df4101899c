//! Listen hooks: ordered extension callbacks run around active listening.
//!
//! A hook point runs its plugins one at a time, in registration order, and
//! stops at the first plugin that asks to stop. A plugin that errors or
//! panics is logged and counts as a stop. Nothing a plugin does can fail the
//! surrounding listen cycle.

use crate::collaborators::{Messenger, Microphone};
use crate::config::HarkConfig;
use crate::error::PluginError;
use async_trait::async_trait;
use futures_util::{FutureExt, StreamExt, TryStreamExt, stream};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error};

/// Named extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// After the wake phrase, before active listening.
    BeforeListen,
    /// After active listening, before dispatch.
    AfterListen,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeListen => f.write_str("before_listen"),
            Self::AfterListen => f.write_str("after_listen"),
        }
    }
}

/// Session context shared with every plugin of one hook run.
#[derive(Clone, Copy)]
pub struct HookContext<'a> {
    /// Audio device, so plugins can speak or listen themselves.
    pub mic: &'a dyn Microphone,
    /// Configuration snapshot.
    pub config: &'a HarkConfig,
    /// External messaging handle, if the host provided one.
    pub messenger: Option<&'a dyn Messenger>,
    /// Wake detection threshold of the current cycle.
    pub threshold: Option<f32>,
}

/// An extension that participates in one or both listen hooks.
///
/// Each hook returns whether the remaining plugins of that hook point should
/// run. The defaults let the chain continue.
#[async_trait]
pub trait ListenPlugin: Send + Sync {
    /// Identity used in logs.
    fn name(&self) -> &str;

    /// Runs after the wake phrase and before active listening.
    async fn before_listen(&self, _ctx: &HookContext<'_>) -> Result<bool, PluginError> {
        Ok(true)
    }

    /// Runs after active listening and before dispatch.
    async fn after_listen(&self, _ctx: &HookContext<'_>) -> Result<bool, PluginError> {
        Ok(true)
    }
}

/// Result of one plugin invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Run the next plugin.
    Continue,
    /// The plugin asked to stop the chain.
    Stop,
    /// The plugin errored or panicked.
    Failed(String),
}

impl HookOutcome {
    /// Only [`HookOutcome::Continue`] lets the chain go on.
    pub fn should_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

/// The plugin that ended a hook run early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedBy {
    /// Plugin name.
    pub plugin: String,
    /// Why it stopped the chain.
    pub outcome: HookOutcome,
}

/// Summary of one hook run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookReport {
    /// Number of plugins invoked, including the one that stopped the chain.
    pub invoked: usize,
    /// Set when the chain ended before the last plugin finished with `Continue`.
    pub stopped_by: Option<StoppedBy>,
}

/// Ordered plugin lists for each hook point.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    before_listen: Vec<Arc<dyn ListenPlugin>>,
    after_listen: Vec<Arc<dyn ListenPlugin>>,
}

impl PluginRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `plugin` to the end of `point`'s list.
    pub fn register(&mut self, point: HookPoint, plugin: Arc<dyn ListenPlugin>) {
        match point {
            HookPoint::BeforeListen => self.before_listen.push(plugin),
            HookPoint::AfterListen => self.after_listen.push(plugin),
        }
    }

    /// Builder form of [`PluginRegistry::register`].
    pub fn with(mut self, point: HookPoint, plugin: Arc<dyn ListenPlugin>) -> Self {
        self.register(point, plugin);
        self
    }

    /// Plugins registered for `point`, in run order.
    pub fn plugins(&self, point: HookPoint) -> &[Arc<dyn ListenPlugin>] {
        match point {
            HookPoint::BeforeListen => &self.before_listen,
            HookPoint::AfterListen => &self.after_listen,
        }
    }

    /// Run every plugin of `point` until one stops the chain.
    pub async fn run(&self, point: HookPoint, ctx: &HookContext<'_>) -> HookReport {
        run_hook(point, self.plugins(point), ctx).await
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |list: &[Arc<dyn ListenPlugin>]| {
            list.iter().map(|p| p.name().to_owned()).collect::<Vec<_>>()
        };
        f.debug_struct("PluginRegistry")
            .field("before_listen", &names(&self.before_listen))
            .field("after_listen", &names(&self.after_listen))
            .finish()
    }
}

/// Run `plugins` in order at `point`, short-circuiting on the first non-continue outcome.
pub async fn run_hook(
    point: HookPoint,
    plugins: &[Arc<dyn ListenPlugin>],
    ctx: &HookContext<'_>,
) -> HookReport {
    let folded = stream::iter(plugins)
        .map(Ok::<_, HookReport>)
        .try_fold(0usize, |invoked, plugin| async move {
            let invoked = invoked + 1;
            let outcome = invoke(point, plugin.as_ref(), ctx).await;
            if outcome.should_continue() {
                Ok(invoked)
            } else {
                Err(HookReport {
                    invoked,
                    stopped_by: Some(StoppedBy {
                        plugin: plugin.name().to_owned(),
                        outcome,
                    }),
                })
            }
        })
        .await;

    match folded {
        Ok(invoked) => HookReport {
            invoked,
            stopped_by: None,
        },
        Err(report) => report,
    }
}

async fn invoke(point: HookPoint, plugin: &dyn ListenPlugin, ctx: &HookContext<'_>) -> HookOutcome {
    let call = async {
        match point {
            HookPoint::BeforeListen => plugin.before_listen(ctx).await,
            HookPoint::AfterListen => plugin.after_listen(ctx).await,
        }
    };

    let result = match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(PluginError::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    };

    match result {
        Ok(true) => HookOutcome::Continue,
        Ok(false) => {
            debug!(plugin = plugin.name(), hook = %point, "plugin stopped the hook chain");
            HookOutcome::Stop
        }
        Err(e) => {
            error!(plugin = plugin.name(), hook = %point, error = ?e, "plugin '{}' run error: {e}", plugin.name());
            HookOutcome::Failed(e.to_string())
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
