//! Shimmer loop for skeleton placeholders.
//!
//! A [`Shimmer`] is the continuous ping-pong driver behind loading-state
//! skeletons: progress sweeps 0 → 1 → 0 for as long as the loop runs.
//! The loop is started when the placeholder mounts and stopped when the
//! real content arrives; stopping resets progress so a later restart
//! begins from the start of a sweep.

use std::time::Duration;

use crate::easing::Easing;

/// Default time for a single 0 → 1 sweep.
pub const DEFAULT_SWEEP: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

/// Continuous ping-pong animation driver.
#[derive(Debug, Clone)]
pub struct Shimmer {
    sweep: Duration,
    easing: Easing,
    running: bool,
    direction: Direction,
    /// Raw progress within the current sweep (0.0 to 1.0).
    progress: f64,
}

impl Shimmer {
    /// Creates an idle shimmer with the default sweep duration.
    pub fn new() -> Self {
        Self::with_sweep(DEFAULT_SWEEP)
    }

    /// Creates an idle shimmer with the given sweep duration.
    pub fn with_sweep(sweep: Duration) -> Self {
        Self {
            sweep,
            easing: Easing::EaseInOut,
            running: false,
            direction: Direction::Forward,
            progress: 0.0,
        }
    }

    /// Sets the easing curve applied by [`value`](Self::value).
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Whether the loop is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts the loop from the beginning of a forward sweep.
    pub fn start(&mut self) {
        self.running = true;
        self.direction = Direction::Forward;
        self.progress = 0.0;
    }

    /// Stops the loop and resets progress.
    pub fn stop(&mut self) {
        self.running = false;
        self.direction = Direction::Forward;
        self.progress = 0.0;
    }

    /// Advances the sweep by `delta`. Idle ticks are no-ops.
    ///
    /// Progress bounces off both ends: overshoot past either boundary is
    /// reflected back so long deltas stay within 0.0..=1.0.
    pub fn tick(&mut self, delta: Duration) {
        if !self.running || self.sweep.is_zero() {
            return;
        }
        let mut step = delta.as_secs_f64() / self.sweep.as_secs_f64();
        // A delta spanning several sweeps reduces to its fractional part
        // of a full round trip.
        step %= 2.0;

        while step > 0.0 {
            match self.direction {
                Direction::Forward => {
                    let room = 1.0 - self.progress;
                    if step <= room {
                        self.progress += step;
                        step = 0.0;
                    } else {
                        step -= room;
                        self.progress = 1.0;
                        self.direction = Direction::Reverse;
                    }
                }
                Direction::Reverse => {
                    if step <= self.progress {
                        self.progress -= step;
                        step = 0.0;
                    } else {
                        step -= self.progress;
                        self.progress = 0.0;
                        self.direction = Direction::Forward;
                    }
                }
            }
        }
    }

    /// Raw sweep progress (0.0 to 1.0), before easing.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Eased animation value (0.0 to 1.0) for rendering.
    pub fn value(&self) -> f64 {
        self.easing.apply(self.progress)
    }
}

impl Default for Shimmer {
    fn default() -> Self {
        Self::new()
    }
}
