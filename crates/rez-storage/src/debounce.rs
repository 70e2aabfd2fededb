//! Write coalescing.
//!
//! A [`Debouncer`] holds at most one pending value and a countdown. Each
//! [`schedule`](Debouncer::schedule) replaces the pending value and
//! restarts the quiet period, so only the last value of a burst is ever
//! released. Time advances through explicit [`tick`](Debouncer::tick)
//! calls; there are no background timers, which also makes teardown
//! trivial: dropping the debouncer drops the pending value.
//!
//! # Example
//!
//! ```rust
//! use rez_storage::Debouncer;
//! use std::time::Duration;
//!
//! let mut d = Debouncer::new(Duration::from_millis(100));
//! d.schedule("mall");
//! d.schedule("cash"); // replaces "mall", restarts the window
//!
//! assert_eq!(d.tick(Duration::from_millis(50)), None);
//! assert_eq!(d.tick(Duration::from_millis(50)), Some("cash"));
//! assert!(!d.is_pending());
//! ```

use std::time::Duration;

/// Single-slot value coalescer with a quiet-period countdown.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<T>,
    remaining: Duration,
}

impl<T> Debouncer<T> {
    /// Creates a debouncer with the given quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            remaining: Duration::ZERO,
        }
    }

    /// Returns the configured quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Returns whether a value is waiting to be released.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Stores `value` as the pending value and restarts the quiet period.
    ///
    /// Any previously pending value is discarded (last-write-wins).
    pub fn schedule(&mut self, value: T) {
        self.pending = Some(value);
        self.remaining = self.quiet;
    }

    /// Advances time by `delta`.
    ///
    /// Returns the pending value once, when the quiet period has fully
    /// elapsed. A zero quiet period releases on the first tick.
    pub fn tick(&mut self, delta: Duration) -> Option<T> {
        self.pending.as_ref()?;
        self.remaining = self.remaining.saturating_sub(delta);
        if self.remaining.is_zero() {
            self.pending.take()
        } else {
            None
        }
    }

    /// Drops the pending value without releasing it.
    ///
    /// Returns the discarded value, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.remaining = Duration::ZERO;
        self.pending.take()
    }

    /// Releases the pending value immediately, bypassing the countdown.
    pub fn flush(&mut self) -> Option<T> {
        self.remaining = Duration::ZERO;
        self.pending.take()
    }
}
