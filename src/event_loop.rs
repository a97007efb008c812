use std::time::{Duration, Instant};

use gstreamer::glib;

/// The loop that dispatches bus, timer and UI callbacks.
pub trait EventLoop {
    fn quit(&self);
}

impl EventLoop for glib::MainLoop {
    fn quit(&self) {
        glib::MainLoop::quit(self);
    }
}

/// A fixed-interval timer polled from the dispatch loop.
///
/// Fires at most once per poll, even when several intervals have passed,
/// and stays silent once cancelled.
#[derive(Debug)]
pub struct IntervalTimer {
    interval: Duration,
    /// `None` when the next firing lies beyond what `Instant` can hold.
    next_due: Option<Instant>,
    active: bool,
}

impl IntervalTimer {
    pub fn register(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now.checked_add(interval),
            active: true,
        }
    }

    /// Returns true when the timer is due, and re-arms it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if self.active && now >= due => {
                self.next_due = now.checked_add(self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time left until the next firing; `None` once cancelled or when it
    /// will never fire.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let due = self.next_due.filter(|_| self.active)?;
        Some(due.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }
}
