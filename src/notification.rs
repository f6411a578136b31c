//! Ephemeral messages shown over the current screen.

use std::time::Duration;

use tokio::time::Instant;

/// How long a notification stays visible.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    shown_at: Instant,
    duration: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
            duration: DEFAULT_DURATION,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notification_auto_dismisses() {
        let notification = Notification::new("Test submitted successfully!", NotificationKind::Success);
        assert!(!notification.is_expired(Instant::now()));

        tokio::time::advance(Duration::from_millis(2999)).await;
        assert!(!notification.is_expired(Instant::now()));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(notification.is_expired(Instant::now()));
    }
}
