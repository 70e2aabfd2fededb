//! Auto-dismissing banner.
//!
//! [`BannerState`] drives the report-toast/success-modal pattern: an
//! entrance transition, an optional auto-close countdown, and an exit
//! transition that ends in exactly one dismissal event.
//!
//! The machine is an explicit phase enum rather than animation calls
//! scattered through component lifecycle hooks:
//!
//! ```text
//! Hidden ──show──► Entering ──► Visible ──(countdown / dismiss)──► Exiting ──► Hidden
//!    ▲                                                                │
//!    └──────────────────────── cancel (silent) ◄─────────────────────┘
//! ```
//!
//! `cancel` is the teardown path (the hosting view went away): it drops
//! straight to `Hidden` without running the exit transition and without
//! emitting an event, so nothing fires against a surface that no longer
//! exists.

use std::time::Duration;

use crate::easing::Easing;

/// Phase of the banner lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BannerPhase {
    /// Not shown.
    #[default]
    Hidden,
    /// Entrance transition in progress.
    Entering,
    /// Fully visible; auto-close countdown (if any) runs here.
    Visible,
    /// Exit transition in progress.
    Exiting,
}

/// Event produced by [`BannerState::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerEvent {
    /// The exit transition completed. Emitted exactly once per showing.
    Dismissed,
}

/// Transition and countdown configuration.
#[derive(Debug, Clone)]
pub struct BannerConfig {
    /// Entrance transition duration.
    pub enter: Duration,
    /// Exit transition duration.
    pub exit: Duration,
    /// Auto-close delay, measured from the moment the banner is fully
    /// visible. `None` or zero means the banner stays until dismissed.
    pub auto_close: Option<Duration>,
    /// Easing applied to the entrance.
    pub enter_easing: Easing,
    /// Easing applied to the exit.
    pub exit_easing: Easing,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            enter: Duration::from_millis(200),
            exit: Duration::from_millis(150),
            auto_close: Some(Duration::from_millis(3000)),
            enter_easing: Easing::EaseOut,
            exit_easing: Easing::EaseIn,
        }
    }
}

impl BannerConfig {
    /// A banner that stays until manually dismissed.
    pub fn persistent() -> Self {
        Self {
            auto_close: None,
            ..Default::default()
        }
    }
}

/// Tick-driven state for an auto-dismissing banner.
#[derive(Debug, Clone)]
pub struct BannerState {
    config: BannerConfig,
    phase: BannerPhase,
    /// Time spent in the current transition phase.
    phase_elapsed: Duration,
    /// Auto-close countdown, armed on entering `Visible`.
    auto_remaining: Option<Duration>,
}

impl BannerState {
    /// Creates a hidden banner with the given configuration.
    pub fn new(config: BannerConfig) -> Self {
        Self {
            config,
            phase: BannerPhase::Hidden,
            phase_elapsed: Duration::ZERO,
            auto_remaining: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> BannerPhase {
        self.phase
    }

    /// Whether the banner occupies the screen in any form.
    pub fn is_visible(&self) -> bool {
        self.phase != BannerPhase::Hidden
    }

    /// Remaining auto-close time, if the countdown is running.
    pub fn auto_remaining(&self) -> Option<Duration> {
        self.auto_remaining
    }

    /// Shows the banner.
    ///
    /// From any phase, including mid-exit, this resets to a fresh
    /// entrance: progress is zeroed and the auto-close countdown is
    /// re-armed. Rapid hide/show sequences therefore always replay the
    /// entrance from the start instead of resuming a half-finished
    /// transition.
    pub fn show(&mut self) {
        self.transition_to(BannerPhase::Entering);
        self.auto_remaining = None;
        if self.config.enter.is_zero() {
            self.enter_visible();
        }
    }

    /// Starts the exit transition.
    ///
    /// Idempotent: dismissing an exiting or hidden banner is a no-op, so
    /// an auto-close expiry racing a manual dismissal cannot double-fire.
    pub fn dismiss(&mut self) {
        match self.phase {
            BannerPhase::Entering | BannerPhase::Visible => {
                self.auto_remaining = None;
                self.transition_to(BannerPhase::Exiting);
            }
            BannerPhase::Exiting | BannerPhase::Hidden => {}
        }
    }

    /// Drops straight to `Hidden` without an exit transition or event.
    ///
    /// This is the path for the hosting view being withdrawn or unmounted:
    /// the countdown is cancelled and nothing fires afterwards.
    pub fn cancel(&mut self) {
        self.transition_to(BannerPhase::Hidden);
        self.auto_remaining = None;
    }

    /// Advances time by `delta`.
    ///
    /// Returns [`BannerEvent::Dismissed`] exactly once, on the tick where
    /// the exit transition completes.
    pub fn tick(&mut self, delta: Duration) -> Option<BannerEvent> {
        match self.phase {
            BannerPhase::Hidden => None,
            BannerPhase::Entering => {
                self.phase_elapsed += delta;
                if self.phase_elapsed >= self.config.enter {
                    self.enter_visible();
                }
                None
            }
            BannerPhase::Visible => {
                if let Some(remaining) = self.auto_remaining {
                    let remaining = remaining.saturating_sub(delta);
                    if remaining.is_zero() {
                        self.auto_remaining = None;
                        self.transition_to(BannerPhase::Exiting);
                    } else {
                        self.auto_remaining = Some(remaining);
                    }
                }
                None
            }
            BannerPhase::Exiting => {
                self.phase_elapsed += delta;
                if self.phase_elapsed >= self.config.exit {
                    self.transition_to(BannerPhase::Hidden);
                    Some(BannerEvent::Dismissed)
                } else {
                    None
                }
            }
        }
    }

    /// Opacity for rendering, derived from the phase and easing (0.0 to 1.0).
    pub fn opacity(&self) -> f64 {
        match self.phase {
            BannerPhase::Hidden => 0.0,
            BannerPhase::Visible => 1.0,
            BannerPhase::Entering => self
                .config
                .enter_easing
                .apply(phase_progress(self.phase_elapsed, self.config.enter)),
            BannerPhase::Exiting => {
                1.0 - self
                    .config
                    .exit_easing
                    .apply(phase_progress(self.phase_elapsed, self.config.exit))
            }
        }
    }

    fn transition_to(&mut self, phase: BannerPhase) {
        self.phase = phase;
        self.phase_elapsed = Duration::ZERO;
    }

    fn enter_visible(&mut self) {
        self.transition_to(BannerPhase::Visible);
        self.auto_remaining = self.config.auto_close.filter(|d| !d.is_zero());
    }
}

/// Progress within a transition phase (0.0 to 1.0).
fn phase_progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0)
}
