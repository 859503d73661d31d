//! Clock and debounce utilities for booth timing.
//!
//! Countdown pacing and preview debouncing both run off a [`Clock`]
//! implementation, so the timed state machines can be driven in tests
//! with virtual time instead of wall-clock waits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Source of time for timed booth sequences.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend the caller for `dur`.
    async fn sleep(&self, dur: Duration);

    /// Time elapsed since this clock's epoch.
    fn now(&self) -> Duration;
}

/// Wall-clock implementation backed by the tokio timer wheel.
#[derive(Debug, Clone)]
pub struct TokioClock {
    epoch: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, dur: Duration) {
        tokio::time::sleep(dur).await;
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Virtual clock for tests: `sleep` completes immediately and advances
/// virtual time by the requested amount, recording each request.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_us: AtomicU64,
    slept: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance virtual time without recording a sleep.
    pub fn advance(&self, dur: Duration) {
        self.now_us.fetch_add(dur.as_micros() as u64, Ordering::SeqCst);
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().expect("clock lock").clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, dur: Duration) {
        self.now_us.fetch_add(dur.as_micros() as u64, Ordering::SeqCst);
        self.slept.lock().expect("clock lock").push(dur);
    }

    fn now(&self) -> Duration {
        Duration::from_micros(self.now_us.load(Ordering::SeqCst))
    }
}

/// Trailing-edge debounce window.
///
/// Each `poke` pushes the deadline out by the full window; `fire`
/// reports true once the deadline has passed and clears it, so a storm
/// of pokes collapses into a single firing.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Register a change at `now`, restarting the quiet window.
    pub fn poke(&mut self, now: Duration) {
        self.deadline = Some(now + self.window);
    }

    /// Whether a firing is scheduled.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time remaining until the pending deadline, if any.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_sub(now))
    }

    /// Consume the deadline if it has elapsed by `now`.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
