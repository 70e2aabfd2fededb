//! Toast queue ordering invariants.
//!
//! ```sh
//! cargo test -p rez-feedback --test toast_queue_order
//! ```
//!
//! # Invariants
//!
//! 1. **FIFO**: display order equals request order, within capacity
//! 2. **Single-flight**: at most one toast is displayed at any point
//! 3. **Drain**: every queue reaches idle in bounded time

use std::sync::mpsc::Receiver;
use std::time::Duration;

use proptest::prelude::*;
use rez_feedback::toast::{
    DEFAULT_TOAST_DURATION, TRANSITION_DELAY, ToastKind, ToastNotice, ToastQueue,
};

/// Tick the queue until idle, with a hard bound so a broken queue fails
/// instead of spinning.
fn run_to_idle(q: &mut ToastQueue) {
    let step = DEFAULT_TOAST_DURATION.max(TRANSITION_DELAY);
    for _ in 0..4096 {
        if q.is_idle() {
            return;
        }
        q.tick(step);
    }
    panic!("queue failed to drain");
}

/// Collect the messages of every `Displayed` notice seen so far.
fn displayed_messages(rx: &Receiver<ToastNotice>) -> Vec<String> {
    rx.try_iter()
        .filter_map(|n| match n {
            ToastNotice::Displayed(item) => Some(item.message),
            _ => None,
        })
        .collect()
}

fn kind_for(i: usize) -> ToastKind {
    match i % 4 {
        0 => ToastKind::Success,
        1 => ToastKind::Error,
        2 => ToastKind::Info,
        _ => ToastKind::Warning,
    }
}

proptest! {
    /// Any burst of requests within the backlog bound displays in call order.
    #[test]
    fn display_order_equals_call_order(messages in prop::collection::vec("[a-z]{1,8}", 1..24)) {
        let mut q = ToastQueue::new();
        let rx = q.subscribe();

        for (i, m) in messages.iter().enumerate() {
            q.show(m.clone(), kind_for(i));
        }
        run_to_idle(&mut q);

        prop_assert_eq!(displayed_messages(&rx), messages);
    }

    /// Interleaving ticks between requests never reorders toasts.
    #[test]
    fn interleaved_ticks_preserve_order(
        messages in prop::collection::vec("[a-z]{1,8}", 2..16),
        gaps_ms in prop::collection::vec(0u64..500, 2..16),
    ) {
        let mut q = ToastQueue::new();
        let rx = q.subscribe();

        for (m, gap) in messages.iter().zip(gaps_ms.iter().cycle()) {
            q.show(m.clone(), ToastKind::Info);
            q.tick(Duration::from_millis(*gap));
        }
        run_to_idle(&mut q);

        prop_assert_eq!(displayed_messages(&rx), messages);
    }

    /// However requests and ticks interleave, dismissals and displays
    /// strictly alternate: a toast is never displayed over another.
    #[test]
    fn displays_and_dismissals_alternate(
        messages in prop::collection::vec("[a-z]{1,8}", 1..16),
        gaps_ms in prop::collection::vec(0u64..4000, 1..16),
    ) {
        let mut q = ToastQueue::new();
        let rx = q.subscribe();

        for (m, gap) in messages.iter().zip(gaps_ms.iter().cycle()) {
            q.show(m.clone(), ToastKind::Info);
            q.tick(Duration::from_millis(*gap));
        }
        run_to_idle(&mut q);

        let mut in_flight = false;
        for notice in rx.try_iter() {
            match notice {
                ToastNotice::Displayed(_) => {
                    prop_assert!(!in_flight, "display while another toast was in flight");
                    in_flight = true;
                }
                ToastNotice::Dismissed(_) => {
                    prop_assert!(in_flight, "dismissal without a displayed toast");
                    in_flight = false;
                }
                ToastNotice::Cleared => in_flight = false,
            }
        }
    }

    /// dismiss_all at an arbitrary point leaves the queue idle for good.
    #[test]
    fn dismiss_all_is_terminal(
        messages in prop::collection::vec("[a-z]{1,8}", 1..16),
        cutoff in 0usize..16,
    ) {
        let mut q = ToastQueue::new();
        for m in &messages {
            q.show(m.clone(), ToastKind::Info);
        }
        for _ in 0..cutoff {
            q.tick(TRANSITION_DELAY);
        }
        q.dismiss_all();
        prop_assert!(q.is_idle());

        q.tick(DEFAULT_TOAST_DURATION);
        prop_assert!(q.is_idle());
        prop_assert!(q.current().is_none());
    }
}
