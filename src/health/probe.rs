//! # Pluggable health verdicts.
//!
//! [`HealthProbe`] is the seam between "how we find out" and "what we do
//! about it": the monitor applies its escalation table to whatever verdict
//! a probe returns.
//!
//! [`InitProbe`] is the stopgap production runs with today: a successful
//! `initialize` counts as healthy, a failed one as failed. `Degraded` is
//! reachable only through a probe with a richer signal (latency, resource
//! usage, a dedicated health endpoint).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::services::ServiceRef;

/// Verdict a probe returns for one service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    /// The service is fine; no action.
    Healthy,
    /// The service is struggling; a soft restart is attempted.
    Degraded,
    /// The service is gone; it is force-restarted with re-registration.
    Failed,
}

impl HealthStatus {
    /// Returns a short stable label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::Degraded => "DEGRADED",
            HealthStatus::Failed => "FAILED",
        }
    }
}

/// Single-method health verdict for one service.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    async fn probe(&self, service: &ServiceRef, ctx: &CancellationToken) -> HealthStatus;
}

/// Default probe: `initialize` doubling as the liveness signal.
pub struct InitProbe;

#[async_trait]
impl HealthProbe for InitProbe {
    async fn probe(&self, service: &ServiceRef, _ctx: &CancellationToken) -> HealthStatus {
        match service.initialize().await {
            Ok(()) => HealthStatus::Healthy,
            Err(_) => HealthStatus::Failed,
        }
    }
}
