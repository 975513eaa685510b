//! # Counter-based metrics subscriber.
//!
//! [`MetricsRecorder`] aggregates runtime events into atomic counters.
//! The daemon only emits; an exporter (or a test) reads a [`MetricsSnapshot`]
//! whenever it wants current totals.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Event-driven counters for the orchestration runtime.
#[derive(Default)]
pub struct MetricsRecorder {
    discovered: AtomicU64,
    registered: AtomicU64,
    started: AtomicU64,
    stopped: AtomicU64,
    failed: AtomicU64,
    unhealthy: AtomicU64,
    restarts: AtomicU64,
    retries: AtomicU64,
    breaker_opens: AtomicU64,
}

/// Point-in-time copy of all counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub discovered: u64,
    pub registered: u64,
    pub started: u64,
    pub stopped: u64,
    pub failed: u64,
    pub unhealthy: u64,
    pub restarts: u64,
    pub retries: u64,
    pub breaker_opens: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            discovered: self.discovered.load(Ordering::Relaxed),
            registered: self.registered.load(Ordering::Relaxed),
            started: self.started.load(Ordering::Relaxed),
            stopped: self.stopped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            unhealthy: self.unhealthy.load(Ordering::Relaxed),
            restarts: self.restarts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            breaker_opens: self.breaker_opens.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl Subscribe for MetricsRecorder {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::DiscoveryCompleted => {
                self.discovered
                    .fetch_add(e.count.unwrap_or(0) as u64, Ordering::Relaxed);
            }
            EventKind::ServiceRegistered => {
                self.registered.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::ServiceStarted => {
                self.started.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::ServiceStopped => {
                self.stopped.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::ServiceFailed | EventKind::DiscoveryFailed | EventKind::RestartFailed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::ServiceUnhealthy | EventKind::ServiceDegraded => {
                self.unhealthy.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::ServiceRestarted => {
                self.restarts.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::RetryScheduled => {
                self.retries.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::BreakerOpened => {
                self.breaker_opens.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "metrics"
    }

    fn queue_capacity(&self) -> usize {
        2048
    }
}
