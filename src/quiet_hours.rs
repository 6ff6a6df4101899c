//! Quiet-hours policy: whether it is a proper time to speak notifications.

use crate::config::QuietHoursConfig;
use chrono::Timelike;

/// Source of the current local wall-clock hour.
pub trait Clock: Send + Sync {
    /// Current local hour, `0..24`.
    fn local_hour(&self) -> u32;
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// Always reports the same hour.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn local_hour(&self) -> u32 {
        self.0
    }
}

impl QuietHoursConfig {
    /// Whether notifications may be spoken at `hour`.
    ///
    /// A disabled profile or one missing either bound always allows.
    /// `since < till` blocks `[since, till)`. Otherwise the window wraps
    /// midnight and blocks `[since, 24) ∪ [0, till)`, which leaves an empty
    /// block when `since == till`.
    pub fn is_proper_time(&self, hour: u32) -> bool {
        if !self.enable {
            return true;
        }
        let (Some(since), Some(till)) = (self.since, self.till) else {
            return true;
        };
        if till > since {
            !(since..till).contains(&hour)
        } else {
            (till..since).contains(&hour) || since == till
        }
    }
}

/// Policy check with an optional profile; `None` always allows.
pub fn is_proper_time(config: Option<&QuietHoursConfig>, hour: u32) -> bool {
    config.is_none_or(|c| c.is_proper_time(hour))
}
