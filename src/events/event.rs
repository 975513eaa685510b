//! # Runtime events emitted by the orchestrator, watcher, and health monitor.
//!
//! The [`EventKind`] enum classifies event types across five categories:
//! - **Discovery events**: outcome of the initial endpoint sweep
//! - **Admission events**: per-service lifecycle flow (registered, initialized, started, failed)
//! - **Watcher events**: dynamic membership changes and stream state
//! - **Health events**: probe verdicts and remediation outcomes
//! - **Resilience / shutdown events**: retries, breaker transitions, graceful stop
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! service name, error messages, retry delays, and admission priorities.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so events can be ordered correctly even when delivered
//! out-of-order through async channels.
//!
//! ## Example
//! ```rust
//! use servisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::ServiceFailed)
//!     .with_service("billing")
//!     .with_error("connection refused")
//!     .with_attempt(2);
//!
//! assert_eq!(ev.kind, EventKind::ServiceFailed);
//! assert_eq!(ev.service.as_deref(), Some("billing"));
//! assert_eq!(ev.error.as_deref(), Some("connection refused"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Discovery events ===
    /// Initial discovery finished; `count` carries the endpoint total.
    DiscoveryCompleted,
    /// Initial discovery failed; background tasks were not launched.
    DiscoveryFailed,

    // === Admission events ===
    /// An endpoint was registered and a service handle obtained.
    ServiceRegistered,
    /// A registered service completed its `initialize` step.
    ServiceInitialized,
    /// A service completed its `start` step and is running.
    ServiceStarted,
    /// A service was stopped.
    ServiceStopped,
    /// A lifecycle step failed for a service.
    ServiceFailed,
    /// A service was removed from the registry.
    ServiceUnregistered,
    /// The whole initial admission batch finished successfully.
    OrchestrationCompleted,

    // === Watcher events ===
    /// The watcher obtained its event stream and is consuming it.
    WatcherStarted,
    /// The watcher exited (cancellation, stream close, or start failure).
    WatcherStopped,
    /// The upstream watch stream closed; dynamic updates are over.
    WatchStreamClosed,
    /// An `ADDED` membership event was received.
    EndpointAdded,
    /// A `MODIFIED` membership event was received.
    EndpointModified,
    /// A `DELETED` membership event was received.
    EndpointDeleted,

    // === Health events ===
    /// A probe reported the service healthy.
    ServiceHealthy,
    /// A probe reported the service degraded; a soft restart follows.
    ServiceDegraded,
    /// A probe reported the service failed; a force restart follows.
    ServiceUnhealthy,
    /// A remediation restart completed successfully.
    ServiceRestarted,
    /// A remediation restart failed; the service is left as-is.
    RestartFailed,

    // === Resilience events ===
    /// A boundary call failed and will be retried after `delay`.
    RetryScheduled,
    /// The circuit breaker opened after consecutive failures.
    BreakerOpened,
    /// The circuit breaker closed after a successful trial call.
    BreakerClosed,

    // === Shutdown events ===
    /// Shutdown requested (OS signal received).
    ShutdownRequested,
    /// All background tasks stopped within the configured grace period.
    AllStoppedWithin,
    /// Grace period exceeded; background tasks were aborted.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// Carries information about service lifecycle, membership changes, health
/// verdicts, retries, and timing.
///
/// ## Fields
///
/// - `seq`: Unique sequence number for ordering (monotonically increasing)
/// - `at`: Wall-clock timestamp (may go backwards due to NTP, use for logging only)
/// - `kind`: Event classification
/// - `service`, `address`, `error`, `attempt`, `delay`, `priority`, `count`:
///   optional metadata
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Name of the service, if applicable.
    pub service: Option<String>,
    /// Address of the endpoint, if applicable.
    pub address: Option<String>,
    /// Error message, if the event represents a failure.
    pub error: Option<String>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u64>,
    /// Retry delay before the next attempt (if relevant).
    pub delay: Option<Duration>,
    /// Admission priority (hybrid strategy only).
    pub priority: Option<i64>,
    /// Endpoint count (discovery only).
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            address: None,
            error: None,
            attempt: None,
            delay: None,
            priority: None,
            count: None,
        }
    }

    /// Attaches a service name.
    pub fn with_service(mut self, name: impl Into<String>) -> Self {
        self.service = Some(name.into());
        self
    }

    /// Attaches an endpoint address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Attaches an error message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    /// Attaches an attempt count.
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a retry delay.
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Attaches an admission priority.
    pub fn with_priority(mut self, p: i64) -> Self {
        self.priority = Some(p);
        self
    }

    /// Attaches an endpoint count.
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }
}
