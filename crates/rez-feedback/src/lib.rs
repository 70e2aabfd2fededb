#![forbid(unsafe_code)]

//! Transient UI feedback for the ReZ client.
//!
//! State machines behind the client's ephemeral surfaces:
//!
//! - [`ToastQueue`] - Single-flight FIFO controller for toast notifications
//! - [`BannerState`] - Auto-dismissing banner with entrance/exit phases
//! - [`Shimmer`] - Ping-pong loop driving skeleton placeholders
//! - [`Easing`] - Curve subset shared by the machines above
//!
//! Everything here is headless and tick-driven: components advance when
//! the host calls `tick(delta)`, and expose scalars (progress, opacity)
//! for whatever actually draws them. No timers run in the background, so
//! dropping a component cancels everything it had pending.

pub mod banner;
pub mod easing;
pub mod shimmer;
pub mod toast;

pub use banner::{BannerConfig, BannerEvent, BannerPhase, BannerState};
pub use easing::Easing;
pub use shimmer::Shimmer;
pub use toast::{ToastId, ToastItem, ToastKind, ToastNotice, ToastQueue};
