// SPDX-License-Identifier: MPL-2.0
//! Pausable auto-close timer.
//!
//! The timer holds the remaining lifetime of a toast. Pausing subtracts the
//! time elapsed since the last start exactly once; resuming starts counting
//! again from the pause point.

use std::time::{Duration, Instant};

/// Remaining-time counter of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseTimer {
    remaining: Duration,
    running_since: Option<Instant>,
}

impl CloseTimer {
    /// Creates a paused timer holding `lifetime`.
    #[must_use]
    pub fn new(lifetime: Duration) -> Self {
        Self {
            remaining: lifetime,
            running_since: None,
        }
    }

    /// Starts counting down. Does nothing while already running.
    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Stops counting down, keeping the remaining time.
    ///
    /// Repeated calls without a resume in between are no-ops.
    pub fn pause(&mut self, now: Instant) {
        if let Some(started) = self.running_since.take() {
            self.remaining = self
                .remaining
                .saturating_sub(now.saturating_duration_since(started));
        }
    }

    /// Restores the full `lifetime`, keeping the running state.
    pub fn restart(&mut self, lifetime: Duration, now: Instant) {
        self.remaining = lifetime;
        if self.running_since.is_some() {
            self.running_since = Some(now);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Remaining time as of `now`.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(started) => self
                .remaining
                .saturating_sub(now.saturating_duration_since(started)),
            None => self.remaining,
        }
    }

    /// Instant the timer fires, if running.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.running_since
            .and_then(|started| started.checked_add(self.remaining))
    }

    #[must_use]
    pub fn expired(&self, now: Instant) -> bool {
        self.is_running() && self.remaining(now).is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn new_timer_is_paused() {
        let timer = CloseTimer::new(100 * MS);
        let now = Instant::now();
        assert!(!timer.is_running());
        assert!(!timer.expired(now + 200 * MS));
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn expires_after_lifetime() {
        let start = Instant::now();
        let mut timer = CloseTimer::new(20 * MS);
        timer.resume(start);

        assert!(!timer.expired(start + 19 * MS));
        assert!(timer.expired(start + 20 * MS));
        assert_eq!(timer.deadline(), Some(start + 20 * MS));
    }

    #[test]
    fn pause_subtracts_elapsed_once() {
        let start = Instant::now();
        let mut timer = CloseTimer::new(100 * MS);
        timer.resume(start);
        timer.pause(start + 30 * MS);
        timer.pause(start + 60 * MS);

        assert_eq!(timer.remaining(start + 90 * MS), 70 * MS);
    }

    #[test]
    fn resume_continues_from_pause_point() {
        let start = Instant::now();
        let mut timer = CloseTimer::new(100 * MS);
        timer.resume(start);
        timer.pause(start + 40 * MS);
        timer.resume(start + 500 * MS);
        timer.resume(start + 550 * MS);

        assert!(!timer.expired(start + 559 * MS));
        assert!(timer.expired(start + 560 * MS));
    }

    #[test]
    fn restart_restores_full_lifetime() {
        let start = Instant::now();
        let mut timer = CloseTimer::new(100 * MS);
        timer.resume(start);
        timer.restart(100 * MS, start + 90 * MS);

        assert_eq!(timer.remaining(start + 100 * MS), 90 * MS);
    }

    #[test]
    fn infinite_lifetime_has_no_deadline() {
        let start = Instant::now();
        let mut timer = CloseTimer::new(Duration::MAX);
        timer.resume(start);
        assert_eq!(timer.deadline(), None);
        assert!(!timer.expired(start + 1000 * MS));
    }
}
