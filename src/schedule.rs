// Schedule-after-delay primitive driving the capture loop

use std::time::{Duration, Instant};

/// Holds at most one pending tick and the delay used to reschedule it.
///
/// The scheduler never sleeps or spawns; the host event loop polls it with the
/// current time and uses `time_until_due` to decide when to wake up again.
#[derive(Clone, Debug)]
pub struct TickScheduler {
    interval: Duration,
    next_due: Option<Instant>,
}

impl TickScheduler {
    /// A scheduler with nothing pending.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Makes the next tick due immediately.
    pub fn schedule_now(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    /// Makes the next tick due one interval after `now`.
    pub fn schedule_after(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Drops the pending tick, if any.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| due <= now)
    }

    /// Consumes the pending tick if it is due.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.next_due = None;
            true
        } else {
            false
        }
    }

    /// Time left until the pending tick; `None` when nothing is scheduled.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due
            .map(|due| due.saturating_duration_since(now))
    }
}
