//! Command pacing
//!
//! The receiver's radio bridge drops commands that arrive too close together.
//! [`Pacer`] enforces a minimum spacing between consecutive sends. Time is read
//! and spent through a [`Clock`] so the spacing can be checked in tests without
//! waiting on the wall clock.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default spacing between two commands
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Source of time for pacing and polling loops
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only advances when slept on. Records every sleep.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    origin: Instant,
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualState {
                origin: Instant::now(),
                elapsed: Duration::ZERO,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Move time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut state) = self.inner.lock() {
            state.elapsed += duration;
        }
    }

    /// Total simulated time since creation
    pub fn elapsed(&self) -> Duration {
        self.inner.lock().map(|s| s.elapsed).unwrap_or_default()
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().map(|s| s.sleeps.clone()).unwrap_or_default()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner
            .lock()
            .map(|s| s.origin + s.elapsed)
            .unwrap_or_else(|_| Instant::now())
    }

    fn sleep(&self, duration: Duration) {
        if let Ok(mut state) = self.inner.lock() {
            state.elapsed += duration;
            state.sleeps.push(duration);
        }
    }
}

/// Minimum-interval rate limiter for outgoing commands
pub struct Pacer {
    clock: Arc<dyn Clock>,
    interval: Duration,
    enabled: bool,
    next_slot: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            interval,
            enabled: true,
            next_slot: None,
        }
    }

    /// Block until the next command may go out.
    pub fn wait_turn(&mut self) {
        if !self.enabled {
            return;
        }
        if let Some(slot) = self.next_slot {
            let now = self.clock.now();
            if slot > now {
                self.clock.sleep(slot - now);
            }
        }
    }

    /// Note that a command just left; the next one waits a full interval.
    pub fn mark_sent(&mut self) {
        self.next_slot = Some(self.clock.now() + self.interval);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling lets callers implement their own spacing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("interval", &self.interval)
            .field("enabled", &self.enabled)
            .finish()
    }
}
