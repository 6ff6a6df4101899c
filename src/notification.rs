//! Queued notifications waiting to be spoken.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

/// A notification produced outside the loop. The loop only speaks its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Text to vocalize.
    pub text: String,
    /// When the notification was queued.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a notification stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Source of pending notifications.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Remove and return everything currently pending, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`HarkError::Notifier`](crate::HarkError::Notifier) when the
    /// backing store cannot be read.
    async fn take_all(&self) -> Result<Vec<Notification>>;
}

/// Thread-safe in-memory FIFO of notifications.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification at the back of the queue.
    pub fn push(&self, notification: Notification) {
        self.lock().push_back(notification);
    }

    /// Number of notifications waiting.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        // A poisoned queue still holds valid notifications.
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl NotificationSource for NotificationQueue {
    async fn take_all(&self) -> Result<Vec<Notification>> {
        Ok(self.lock().drain(..).collect())
    }
}
