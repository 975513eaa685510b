//! # Admission strategies.
//!
//! A [`Strategy`] takes a batch of discovered endpoints through the
//! three-step lifecycle `register → initialize → start` under a policy:
//!
//! - **[`SerialStrategy`]** — input order, fail-fast; for ordered startups.
//! - **[`ParallelStrategy`]** — one task per endpoint, barrier at the end,
//!   failures aggregated into one non-specific error; for independent
//!   services that should not gate each other.
//! - **[`HybridStrategy`]** — priority-ordered drain of a min-heap,
//!   fail-fast; for mixed fleets where some services must come up first.
//!
//! ## Architecture
//! ```text
//! Orchestrator ──► Strategy::orchestrate(ctx, endpoints)
//!                       │
//!                       │ (per endpoint, policy-ordered)
//!                       ▼
//!                  Admission::admit()
//!                       ├─► services.register(endpoint)   → ServiceRegistered
//!                       ├─► retry( service.initialize() ) → ServiceInitialized
//!                       └─► retry( service.start(ctx) )   → ServiceStarted
//! ```
//!
//! ## Rules
//! - The three-step helper is the **only** code strategies share.
//! - Initialize and start are wrapped in the resilience retry; register is
//!   a local registry operation and is not.
//! - A step failure aborts that endpoint only; whether it aborts the batch
//!   is the strategy's call.
//! - Strategy selection is a pure function of the configured name; unknown
//!   or empty names fall back to serial with a warning.

mod hybrid;
mod parallel;
mod queue;
mod serial;

pub use hybrid::HybridStrategy;
pub use parallel::ParallelStrategy;
pub use queue::{EndpointItem, PriorityQueue, DEFAULT_SERVICE_PRIORITY};
pub use serial::SerialStrategy;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::OrchestratorConfig;
use crate::error::{OrchestrateError, ServiceError};
use crate::events::{Bus, Event, EventKind};
use crate::resilience::Resilience;
use crate::services::{ServiceEndpoint, ServiceRef, Services};

/// A policy for ordering/parallelising admission of a batch of endpoints.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Admits every endpoint in the batch under this policy.
    async fn orchestrate(
        &self,
        ctx: &CancellationToken,
        endpoints: &[ServiceEndpoint],
    ) -> Result<(), OrchestrateError>;
}

/// Builds the strategy selected by configuration.
///
/// Unknown or empty names fall back to serial with a warning.
pub fn from_config(
    cfg: &OrchestratorConfig,
    services: Arc<dyn Services>,
    resilience: Arc<Resilience>,
    bus: Bus,
) -> Box<dyn Strategy> {
    let admission = Admission::new(services, resilience, bus.clone());
    match cfg.strategy.as_str() {
        "serial" => Box::new(SerialStrategy::new(admission)),
        "parallel" => Box::new(ParallelStrategy::new(admission)),
        "hybrid" => Box::new(HybridStrategy::new(admission, cfg)),
        "" => {
            warn!("no orchestration strategy configured; defaulting to serial");
            Box::new(SerialStrategy::new(admission))
        }
        other => {
            warn!(strategy = other, "unknown orchestration strategy; defaulting to serial");
            Box::new(SerialStrategy::new(admission))
        }
    }
}

/// Shared three-step lifecycle helper: `register → initialize → start`.
#[derive(Clone)]
pub(crate) struct Admission {
    services: Arc<dyn Services>,
    resilience: Arc<Resilience>,
    bus: Bus,
}

impl Admission {
    pub(crate) fn new(
        services: Arc<dyn Services>,
        resilience: Arc<Resilience>,
        bus: Bus,
    ) -> Self {
        Self {
            services,
            resilience,
            bus,
        }
    }

    /// Takes one endpoint through the full lifecycle.
    ///
    /// Initialize and start cross the service boundary and are wrapped in
    /// the resilience retry; any step failing aborts this endpoint.
    pub(crate) async fn admit(
        &self,
        ctx: &CancellationToken,
        endpoint: &ServiceEndpoint,
    ) -> Result<ServiceRef, ServiceError> {
        let service = self.services.register(endpoint).await?;
        info!(service = service.name(), "service registered");
        self.bus.publish(
            Event::now(EventKind::ServiceRegistered)
                .with_service(service.name())
                .with_address(service.address()),
        );

        self.resilience
            .execute_with_retry(ctx, endpoint.name.as_str(), || service.initialize())
            .await?;
        info!(service = service.name(), "service initialized");
        self.bus.publish(
            Event::now(EventKind::ServiceInitialized).with_service(service.name()),
        );

        self.resilience
            .execute_with_retry(ctx, endpoint.name.as_str(), || service.start(ctx))
            .await?;
        info!(service = service.name(), "service started");
        self.bus
            .publish(Event::now(EventKind::ServiceStarted).with_service(service.name()));

        Ok(service)
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }
}
