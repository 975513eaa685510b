//! # Event subscribers for the orchestration daemon.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling runtime events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Orchestrator / Watcher / HealthMonitor ── publish(Event) ──► Bus
//!                                                                 │
//!                               SubscriberSet::listen() ◄─────────┘
//!                                      │
//!                            ┌─────────┼──────────┐
//!                            ▼         ▼          ▼
//!                        LogWriter  MetricsRecorder  Custom
//! ```
//!
//! ## Subscriber types
//! - **[`LogWriter`]** — renders events as structured `tracing` records
//! - **[`MetricsRecorder`]** — aggregates events into atomic counters
//! - Custom subscribers implement [`Subscribe`] and are fanned out by
//!   [`SubscriberSet`] with per-subscriber queues and panic isolation

mod log;
mod metrics;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use metrics::{MetricsRecorder, MetricsSnapshot};
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
