//! Toast notification queue.
//!
//! A toast is a transient, non-blocking notification banner. Any number
//! of producers may request one at any time; the [`ToastQueue`] serializes
//! presentation so exactly one toast is displayed at a time, in
//! first-requested-first-shown order.
//!
//! The queue is an explicit controller object, not a global: create one
//! per app (or per test) and hand it to whoever needs to show toasts.
//!
//! # Lifecycle
//!
//! ```text
//! show ──► displayed ──(duration elapses / dismiss)──► cool-down ──► next
//!    └───► backlog (FIFO) ──────────────────────────────────┘
//! ```
//!
//! The cool-down between toasts gives the outgoing exit animation room
//! to finish before the next toast enters.
//!
//! # Example
//!
//! ```rust
//! use rez_feedback::toast::{ToastKind, ToastQueue};
//! use std::time::Duration;
//!
//! let mut toasts = ToastQueue::new();
//! toasts.success("Cashback credited");
//! toasts.error("Voucher expired");
//!
//! assert_eq!(toasts.current().unwrap().message, "Cashback credited");
//! assert_eq!(toasts.backlog_len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::mpsc;
use std::time::Duration;

/// Unique identifier for a toast notification.
///
/// Ids are per-queue, monotonically increasing, and never reused, so they
/// double as a FIFO tie-breaker for toasts with identical content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub u64);

/// Message type, controlling icon and styling downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    /// Success indicator.
    Success,
    /// Error indicator.
    Error,
    /// Informational.
    #[default]
    Info,
    /// Warning indicator.
    Warning,
}

impl ToastKind {
    /// Stable name for logging and theming lookups.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

/// A queued or displayed toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastItem {
    /// Unique identifier.
    pub id: ToastId,
    /// Display text.
    pub message: String,
    /// Message type.
    pub kind: ToastKind,
    /// Auto-dismiss duration. `None` means persistent until dismissed.
    pub duration: Option<Duration>,
}

/// Notification sent to queue subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastNotice {
    /// A toast took the display slot.
    Displayed(ToastItem),
    /// The displayed toast was dismissed (manually or by expiry).
    Dismissed(ToastId),
    /// `dismiss_all` wiped the slot and the backlog.
    Cleared,
}

/// Default auto-dismiss duration for new toasts.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Cool-down between one toast leaving and the next entering.
pub const TRANSITION_DELAY: Duration = Duration::from_millis(300);

/// Default bound on the backlog. Oldest queued toasts are dropped beyond it.
pub const DEFAULT_BACKLOG_LIMIT: usize = 32;

struct Active {
    item: ToastItem,
    /// Countdown to auto-dismiss; `None` for persistent toasts.
    remaining: Option<Duration>,
}

/// Single-flight FIFO controller for toast notifications.
///
/// # Invariants
///
/// - At most one toast is displayed at any time.
/// - The backlog preserves request order.
/// - The backlog never exceeds its limit; overflow drops the oldest
///   queued toast (the displayed toast is never dropped).
pub struct ToastQueue {
    next_id: u64,
    current: Option<Active>,
    backlog: VecDeque<ToastItem>,
    /// Remaining cool-down after a dismissal, if one is in progress.
    cooldown: Option<Duration>,
    transition: Duration,
    limit: usize,
    subscribers: Vec<mpsc::Sender<ToastNotice>>,
}

impl ToastQueue {
    /// Creates an empty queue with default transition delay and backlog limit.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            current: None,
            backlog: VecDeque::new(),
            cooldown: None,
            transition: TRANSITION_DELAY,
            limit: DEFAULT_BACKLOG_LIMIT,
            subscribers: Vec::new(),
        }
    }

    /// Sets the cool-down between consecutive toasts.
    #[must_use]
    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    /// Sets the backlog bound.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `limit` is zero.
    #[must_use]
    pub fn with_backlog_limit(mut self, limit: usize) -> Self {
        debug_assert!(limit > 0, "backlog limit must be positive");
        self.limit = limit;
        self
    }

    // --- Producers ---

    /// Enqueues a toast with the default duration.
    ///
    /// Displays it immediately if the slot is free and no cool-down is in
    /// progress; otherwise appends it to the backlog.
    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind) -> ToastId {
        self.show_with(message, kind, Some(DEFAULT_TOAST_DURATION))
    }

    /// Enqueues a toast with an explicit duration.
    ///
    /// `None` or a zero duration makes the toast persistent: it stays
    /// until manually dismissed.
    pub fn show_with(
        &mut self,
        message: impl Into<String>,
        kind: ToastKind,
        duration: Option<Duration>,
    ) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;

        let duration = duration.filter(|d| !d.is_zero());
        let item = ToastItem {
            id,
            message: message.into(),
            kind,
            duration,
        };

        if self.current.is_none() && self.cooldown.is_none() {
            self.display(item);
        } else {
            if self.backlog.len() >= self.limit
                && let Some(dropped) = self.backlog.pop_front()
            {
                tracing::warn!(
                    dropped = dropped.id.0,
                    limit = self.limit,
                    "toast backlog full, dropping oldest queued toast"
                );
            }
            self.backlog.push_back(item);
        }
        id
    }

    /// Enqueues a success toast.
    pub fn success(&mut self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Success)
    }

    /// Enqueues an error toast.
    pub fn error(&mut self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Error)
    }

    /// Enqueues an info toast.
    pub fn info(&mut self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Info)
    }

    /// Enqueues a warning toast.
    pub fn warning(&mut self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Warning)
    }

    // --- Observers ---

    /// The currently displayed toast, if any.
    pub fn current(&self) -> Option<&ToastItem> {
        self.current.as_ref().map(|a| &a.item)
    }

    /// Remaining time before the displayed toast auto-dismisses.
    ///
    /// `None` if nothing is displayed or the toast is persistent.
    pub fn current_remaining(&self) -> Option<Duration> {
        self.current.as_ref().and_then(|a| a.remaining)
    }

    /// Number of toasts waiting in the backlog.
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Whether the slot, backlog, and cool-down are all empty.
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.backlog.is_empty() && self.cooldown.is_none()
    }

    /// Registers a subscriber.
    ///
    /// The receiver sees every [`ToastNotice`] from this point on.
    /// Dropped receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> mpsc::Receiver<ToastNotice> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    // --- Dismissal ---

    /// Manually dismisses the displayed toast.
    ///
    /// Starts the cool-down; the backlog head is promoted once it ends.
    /// No-op if nothing is displayed.
    pub fn dismiss(&mut self) {
        self.retire_current();
    }

    /// Clears the displayed toast and empties the backlog synchronously.
    ///
    /// Queued toasts never fire; any cool-down in progress is discarded.
    pub fn dismiss_all(&mut self) {
        self.current = None;
        self.backlog.clear();
        self.cooldown = None;
        self.emit(ToastNotice::Cleared);
    }

    /// Advances time by `delta`.
    ///
    /// Drives the auto-dismiss countdown of the displayed toast and the
    /// cool-down between toasts. Each call settles at most one stage; a
    /// delta larger than the remaining countdown does not roll over into
    /// the next stage.
    pub fn tick(&mut self, delta: Duration) {
        if let Some(cd) = self.cooldown {
            let cd = cd.saturating_sub(delta);
            if cd.is_zero() {
                self.cooldown = None;
                self.promote();
            } else {
                self.cooldown = Some(cd);
            }
            return;
        }

        let expired = match &mut self.current {
            Some(Active {
                remaining: Some(remaining),
                ..
            }) => {
                *remaining = remaining.saturating_sub(delta);
                remaining.is_zero()
            }
            _ => false,
        };
        if expired {
            self.retire_current();
        }
    }

    // --- Internals ---

    fn display(&mut self, item: ToastItem) {
        let remaining = item.duration;
        self.emit(ToastNotice::Displayed(item.clone()));
        self.current = Some(Active { item, remaining });
    }

    fn retire_current(&mut self) {
        let Some(active) = self.current.take() else {
            return;
        };
        self.emit(ToastNotice::Dismissed(active.item.id));
        if self.transition.is_zero() {
            self.promote();
        } else {
            self.cooldown = Some(self.transition);
        }
    }

    fn promote(&mut self) {
        if let Some(item) = self.backlog.pop_front() {
            self.display(item);
        }
    }

    fn emit(&mut self, notice: ToastNotice) {
        self.subscribers.retain(|tx| tx.send(notice.clone()).is_ok());
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToastQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastQueue")
            .field("current", &self.current())
            .field("backlog", &self.backlog.len())
            .field("cooldown", &self.cooldown)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tick through the cool-down in one go.
    fn settle_transition(q: &mut ToastQueue) {
        q.tick(TRANSITION_DELAY);
    }

    #[test]
    fn first_toast_displays_immediately() {
        let mut q = ToastQueue::new();
        let id = q.success("A");
        let current = q.current().unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.message, "A");
        assert_eq!(current.kind, ToastKind::Success);
        assert_eq!(q.backlog_len(), 0);
    }

    #[test]
    fn later_toasts_queue_in_call_order() {
        let mut q = ToastQueue::new();
        q.success("A");
        q.error("B");
        q.info("C");

        assert_eq!(q.current().unwrap().message, "A");

        q.tick(DEFAULT_TOAST_DURATION);
        settle_transition(&mut q);
        assert_eq!(q.current().unwrap().message, "B");

        q.tick(DEFAULT_TOAST_DURATION);
        settle_transition(&mut q);
        assert_eq!(q.current().unwrap().message, "C");
    }

    #[test]
    fn ids_are_monotonic_and_unique() {
        let mut q = ToastQueue::new();
        let a = q.info("same text");
        let b = q.info("same text");
        let c = q.info("same text");
        assert!(a < b && b < c);
    }

    #[test]
    fn single_flight_holds_through_sequence() {
        let mut q = ToastQueue::new();
        q.success("A");
        q.success("B");

        // Only the slot counts as displayed
        assert!(q.current().is_some());
        assert_eq!(q.backlog_len(), 1);

        // During the cool-down nothing is displayed
        q.tick(DEFAULT_TOAST_DURATION);
        assert!(q.current().is_none());
        q.tick(Duration::from_millis(100));
        assert!(q.current().is_none());
        q.tick(Duration::from_millis(200));
        assert_eq!(q.current().unwrap().message, "B");
    }

    #[test]
    fn show_during_cooldown_goes_to_backlog() {
        let mut q = ToastQueue::new();
        q.success("A");
        q.dismiss();
        assert!(q.current().is_none());

        // Slot is free but cool-down is in progress
        q.success("B");
        assert!(q.current().is_none());
        assert_eq!(q.backlog_len(), 1);

        settle_transition(&mut q);
        assert_eq!(q.current().unwrap().message, "B");
    }

    #[test]
    fn manual_dismiss_short_circuits_duration() {
        let mut q = ToastQueue::new();
        q.success("A");
        q.tick(Duration::from_millis(500));
        q.dismiss();
        assert!(q.current().is_none());
    }

    #[test]
    fn dismiss_with_empty_slot_is_noop() {
        let mut q = ToastQueue::new();
        q.dismiss();
        assert!(q.is_idle());
    }

    #[test]
    fn dismiss_all_clears_everything_synchronously() {
        let mut q = ToastQueue::new();
        q.success("A");
        q.error("B");
        q.info("C");

        q.dismiss_all();
        assert!(q.current().is_none());
        assert_eq!(q.backlog_len(), 0);
        assert!(q.is_idle());

        // Nothing resurfaces later
        q.tick(Duration::from_secs(10));
        assert!(q.current().is_none());
    }

    #[test]
    fn auto_dismiss_fires_at_duration() {
        let mut q = ToastQueue::new();
        q.show_with("A", ToastKind::Info, Some(Duration::from_millis(3000)));

        q.tick(Duration::from_millis(2999));
        assert!(q.current().is_some());
        q.tick(Duration::from_millis(1));
        assert!(q.current().is_none());
    }

    #[test]
    fn persistent_toast_never_auto_dismisses() {
        let mut q = ToastQueue::new();
        q.show_with("stay", ToastKind::Warning, None);

        q.tick(Duration::from_secs(3600));
        assert_eq!(q.current().unwrap().message, "stay");

        q.dismiss();
        assert!(q.current().is_none());
    }

    #[test]
    fn zero_duration_means_persistent() {
        let mut q = ToastQueue::new();
        q.show_with("stay", ToastKind::Info, Some(Duration::ZERO));
        assert!(q.current_remaining().is_none());
        q.tick(Duration::from_secs(60));
        assert!(q.current().is_some());
    }

    #[test]
    fn current_remaining_counts_down() {
        let mut q = ToastQueue::new();
        q.success("A");
        q.tick(Duration::from_millis(1000));
        assert_eq!(q.current_remaining(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn backlog_overflow_drops_oldest_queued() {
        let mut q = ToastQueue::new().with_backlog_limit(2);
        q.info("displayed");
        q.info("q1");
        q.info("q2");
        q.info("q3"); // drops q1

        assert_eq!(q.backlog_len(), 2);

        q.tick(DEFAULT_TOAST_DURATION);
        settle_transition(&mut q);
        assert_eq!(q.current().unwrap().message, "q2");
    }

    #[test]
    fn zero_transition_promotes_immediately() {
        let mut q = ToastQueue::new().with_transition(Duration::ZERO);
        q.success("A");
        q.success("B");
        q.dismiss();
        assert_eq!(q.current().unwrap().message, "B");
    }

    #[test]
    fn subscriber_sees_lifecycle_notices() {
        let mut q = ToastQueue::new();
        let rx = q.subscribe();

        let a = q.success("A");
        q.error("B");
        q.dismiss();
        settle_transition(&mut q);
        q.dismiss_all();

        let notices: Vec<ToastNotice> = rx.try_iter().collect();
        assert_eq!(notices.len(), 4);
        match &notices[0] {
            ToastNotice::Displayed(item) => assert_eq!(item.message, "A"),
            other => panic!("unexpected notice: {other:?}"),
        }
        assert_eq!(notices[1], ToastNotice::Dismissed(a));
        match &notices[2] {
            ToastNotice::Displayed(item) => assert_eq!(item.message, "B"),
            other => panic!("unexpected notice: {other:?}"),
        }
        assert_eq!(notices[3], ToastNotice::Cleared);
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut q = ToastQueue::new();
        let rx = q.subscribe();
        drop(rx);
        q.success("A");
        assert_eq!(q.subscribers.len(), 0);
    }

    #[test]
    fn queue_drains_to_idle() {
        let mut q = ToastQueue::new();
        q.success("A");
        q.success("B");

        for _ in 0..2 {
            q.tick(DEFAULT_TOAST_DURATION);
            settle_transition(&mut q);
        }
        assert!(q.is_idle());
    }
}
