//! Debounce timer for autosave.
//!
//! Cancel-and-restart semantics: every edit pushes the deadline out by the
//! full delay, so a typing burst coalesces into one save once the keyboard
//! goes quiet. Time is injected by the caller, which keeps the scheduler
//! deterministic under test and free of any timer thread.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct SaveScheduler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the countdown from `now`. A pending deadline is superseded,
    /// never fired early.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the quiet period has elapsed.
    pub fn due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
