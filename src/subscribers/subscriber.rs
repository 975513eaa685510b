//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] — the extension point for plugging custom event
//! handlers (logging, metrics, alerting) into the daemon.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics caught and logged, runtime continues)
//!
//! ## Rules
//! - Slow subscribers only affect themselves (queue overflow → event drop)
//! - Subscribers **do not block** publishers or other subscribers
//! - Queue capacity is **per-subscriber**, not global

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// Receives events from the daemon via a dedicated worker task with a
/// bounded queue.
///
/// ### Implementation requirements
/// - **Async-friendly**: avoid blocking operations, use async I/O
/// - **Error handling**: handle errors internally, do not panic
/// - Slow processing only affects this subscriber's queue
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, sequentially in FIFO order.
    async fn on_event(&self, event: &Event);

    /// Returns subscriber name for logging.
    ///
    /// Keep short and descriptive (e.g., "log", "metrics", "audit").
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns preferred queue capacity for this subscriber.
    ///
    /// When the queue is full new events are dropped for this subscriber
    /// only; other subscribers are unaffected.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
