//! Owned session timers
//!
//! Both timers run as tokio tasks tied to a `CancellationToken`; dropping
//! the owner cancels the task.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::FocusTarget;

/// One-shot idle timer
///
/// Re-arming cancels the previous countdown.
#[derive(Debug, Default)]
pub struct IdleTimer {
    token: Option<CancellationToken>,
}

impl IdleTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm<F>(&mut self, after: Duration, on_expire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(after) => on_expire(),
                _ = cancelled.cancelled() => {}
            }
        });
        self.token = Some(token);
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Shortest refocus period; anything below is raised to it
pub const MIN_REFOCUS_PERIOD: Duration = Duration::from_millis(100);

/// Periodic input refocus
///
/// The first refocus happens one full period after `start`.
pub struct RefocusTicker {
    token: CancellationToken,
}

impl RefocusTicker {
    pub fn start(period: Duration, target: Arc<dyn FocusTarget>) -> Self {
        let period = if period < MIN_REFOCUS_PERIOD {
            tracing::warn!(
                ?period,
                min = ?MIN_REFOCUS_PERIOD,
                "Refocus period too short, raised"
            );
            MIN_REFOCUS_PERIOD
        } else {
            period
        };
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => target.focus_input(),
                    _ = cancelled.cancelled() => break,
                }
            }
        });
        Self { token }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for RefocusTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
