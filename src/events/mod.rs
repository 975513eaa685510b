//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the orchestrator,
//! strategies, watcher, health monitor, and resilience wrapper.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Orchestrator`, the admission helper inside
//!   `strategies`, `ServiceWatcher`, `HealthMonitor`, `Resilience`.
//! - **Consumers**: the subscriber listener spawned by the daemon (fans out
//!   to [`SubscriberSet`](crate::subscribers::SubscriberSet)).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
