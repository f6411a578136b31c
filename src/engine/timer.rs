//! Countdown state and the scheduled task that drives it.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Real-time length of one countdown step.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Below this many remaining seconds the timer is shown as a warning.
pub const WARNING_THRESHOLD_SECONDS: u64 = 300;

/// Result of applying one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; carries the remaining seconds.
    Running(u64),
    /// Reached zero on this tick. Reported exactly once.
    Expired,
    /// Already expired, nothing changed.
    Stopped,
}

/// Numeric countdown. `remaining` never exceeds `total` and never increases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total: u64,
    remaining: u64,
    expiry_reported: bool,
}

impl Countdown {
    pub fn new(total_seconds: u64) -> Self {
        Self {
            total: total_seconds,
            remaining: total_seconds,
            expiry_reported: false,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn elapsed(&self) -> u64 {
        self.total - self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn is_warning(&self) -> bool {
        self.remaining < WARNING_THRESHOLD_SECONDS
    }

    /// Decrements by exactly one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.expiry_reported {
            return TickOutcome::Stopped;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expiry_reported = true;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }

    /// Reports expiry of a countdown that is already at zero without ticking,
    /// e.g. a zero-length timer. Returns true at most once.
    pub fn take_expiry(&mut self) -> bool {
        if self.remaining == 0 && !self.expiry_reported {
            self.expiry_reported = true;
            true
        } else {
            false
        }
    }
}

/// Formats seconds as `HH:MM:SS`.
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// A periodic task with an explicit cancellation token.
///
/// Once [`Ticker::cancel`] has been called (or the ticker dropped), `next`
/// returns `None` and no further tick is ever delivered.
pub struct Ticker {
    ticks: mpsc::Receiver<()>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Ticker {
    /// Spawns the ticking task on the current runtime. The first tick fires
    /// one `period` after spawning.
    pub fn spawn(period: Duration) -> Self {
        let (tick_tx, tick_rx) = mpsc::channel(1);
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            // A stalled consumer delays later ticks instead of receiving a burst.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    _ = interval.tick() => {
                        if tick_tx.send(()).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            ticks: tick_rx,
            cancel: Some(cancel_tx),
            task,
        }
    }

    /// Waits for the next tick.
    pub async fn next(&mut self) -> Option<()> {
        if self.is_cancelled() {
            return None;
        }
        self.ticks.recv().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
            self.ticks.close();
            self.task.abort();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
