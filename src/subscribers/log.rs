//! # Structured logging subscriber.
//!
//! [`LogWriter`] renders runtime events as `tracing` records at a severity
//! matching the event kind: failures at error, remediation and fallbacks at
//! warn, everything else at info.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Tracing-backed logging subscriber.
///
/// The core components already log their own decisions; this subscriber
/// adds a uniform, greppable record of every event that crosses the bus,
/// which is what operators usually tail.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let service = e.service.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::DiscoveryCompleted => {
                info!(count = e.count.unwrap_or(0), "discovery completed");
            }
            EventKind::DiscoveryFailed => {
                error!(error = e.error.as_deref().unwrap_or("-"), "discovery failed");
            }
            EventKind::ServiceRegistered => {
                info!(service, address = e.address.as_deref().unwrap_or("-"), "service registered");
            }
            EventKind::ServiceInitialized => info!(service, "service initialized"),
            EventKind::ServiceStarted => info!(service, "service started"),
            EventKind::ServiceStopped => info!(service, "service stopped"),
            EventKind::ServiceFailed => {
                error!(service, error = e.error.as_deref().unwrap_or("-"), "service failed");
            }
            EventKind::ServiceUnregistered => info!(service, "service unregistered"),
            EventKind::OrchestrationCompleted => info!("orchestration completed"),
            EventKind::WatcherStarted => info!("service watcher started"),
            EventKind::WatcherStopped => info!("service watcher stopped"),
            EventKind::WatchStreamClosed => warn!("service watch stream closed"),
            EventKind::EndpointAdded => {
                info!(service, address = e.address.as_deref().unwrap_or("-"), "endpoint added");
            }
            EventKind::EndpointModified => info!(service, "endpoint modified"),
            EventKind::EndpointDeleted => info!(service, "endpoint deleted"),
            EventKind::ServiceHealthy => info!(service, "health check passed"),
            EventKind::ServiceDegraded => warn!(service, "service degraded"),
            EventKind::ServiceUnhealthy => {
                error!(service, error = e.error.as_deref().unwrap_or("-"), "service unhealthy");
            }
            EventKind::ServiceRestarted => info!(service, "service restarted"),
            EventKind::RestartFailed => {
                error!(service, error = e.error.as_deref().unwrap_or("-"), "restart failed");
            }
            EventKind::RetryScheduled => {
                warn!(
                    service,
                    attempt = e.attempt.unwrap_or(0),
                    delay = ?e.delay.unwrap_or_default(),
                    error = e.error.as_deref().unwrap_or("-"),
                    "retry scheduled"
                );
            }
            EventKind::BreakerOpened => warn!(service, "circuit breaker opened"),
            EventKind::BreakerClosed => info!(service, "circuit breaker closed"),
            EventKind::ShutdownRequested => info!("shutdown requested"),
            EventKind::AllStoppedWithin => info!("all background tasks stopped within grace"),
            EventKind::GraceExceeded => warn!("grace period exceeded"),
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
