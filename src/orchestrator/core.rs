//! # Orchestrator: one control loop over discovery, strategy, watcher, and health.
//!
//! [`Orchestrator`] composes the subsystems into a single entry point:
//!
//! ```text
//! Orchestrator::orchestrate(ctx)
//!     ├─► Filter from config
//!     ├─► services.discover(ctx, filter)        (retry-wrapped, 5s bound)
//!     ├─► strategy.orchestrate(ctx, endpoints)  (serial | parallel | hybrid)
//!     ├─► spawn ServiceWatcher::run(ctx, filter)
//!     ├─► spawn HealthMonitor::run(ctx)
//!     └─► return — background tasks outlive the call
//! ```
//!
//! ## Rules
//! - A discovery or strategy failure returns synchronously; background
//!   tasks are **not** launched.
//! - Both background tasks share the caller's cancellation token; when it
//!   fires they exit within one tick plus one blocking call.
//! - [`Orchestrator::drain`] bounds shutdown with a grace period and aborts
//!   whatever is left when it runs out.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::CoreConfig;
use crate::error::{OrchestrateError, ServiceError};
use crate::events::{Bus, Event, EventKind};
use crate::health::{HealthMonitor, HealthProbe, InitProbe};
use crate::resilience::Resilience;
use crate::services::{Filter, ServiceEndpoint, Services};
use crate::strategies::{self, Strategy};
use crate::watcher::ServiceWatcher;

/// Tick period for the health monitor.
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Upper bound on each initial discovery attempt.
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Glues discovery, strategy, watcher, and health monitor together.
pub struct Orchestrator {
    cfg: CoreConfig,
    services: Arc<dyn Services>,
    strategy: Box<dyn Strategy>,
    watcher: Arc<ServiceWatcher>,
    monitor: Arc<HealthMonitor>,
    resilience: Arc<Resilience>,
    bus: Bus,
    background: Mutex<JoinSet<()>>,
}

impl Orchestrator {
    /// Builds an orchestrator with the placeholder health probe.
    pub fn new(cfg: CoreConfig, services: Arc<dyn Services>, bus: Bus) -> Self {
        Self::with_probe(cfg, services, bus, Arc::new(InitProbe))
    }

    /// Builds an orchestrator with a custom health probe.
    pub fn with_probe(
        cfg: CoreConfig,
        services: Arc<dyn Services>,
        bus: Bus,
        probe: Arc<dyn HealthProbe>,
    ) -> Self {
        let resilience = Resilience::new(&cfg.resilience, bus.clone());
        let strategy = strategies::from_config(
            &cfg.orchestrator,
            Arc::clone(&services),
            Arc::clone(&resilience),
            bus.clone(),
        );
        let watcher = Arc::new(ServiceWatcher::new(Arc::clone(&services), bus.clone()));
        let monitor = Arc::new(HealthMonitor::new(
            Arc::clone(&services),
            probe,
            HEALTH_CHECK_INTERVAL,
            bus.clone(),
        ));

        Self {
            cfg,
            services,
            strategy,
            watcher,
            monitor,
            resilience,
            bus,
            background: Mutex::new(JoinSet::new()),
        }
    }

    /// Runs the initial admission batch, then launches the watcher and the
    /// health monitor bound to `ctx`.
    ///
    /// Returns as soon as the batch is admitted; the background tasks
    /// outlive the call and stop when `ctx` is cancelled.
    pub async fn orchestrate(&self, ctx: CancellationToken) -> Result<(), OrchestrateError> {
        let filter = self.cfg.discovery.filter.as_ref().map(Filter::from);
        let discover_filter = filter.clone().unwrap_or_default();

        let endpoints = match self.discover(&ctx, &discover_filter).await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                error!(error = %e, "failed to discover services");
                self.bus.publish(
                    Event::now(EventKind::DiscoveryFailed).with_error(e.to_string()),
                );
                return Err(OrchestrateError::Discovery(e));
            }
        };
        info!(count = endpoints.len(), "discovered services");
        self.bus.publish(
            Event::now(EventKind::DiscoveryCompleted).with_count(endpoints.len()),
        );

        if let Err(e) = self.strategy.orchestrate(&ctx, &endpoints).await {
            error!(error = %e, "orchestration failed");
            return Err(e);
        }
        info!("orchestration completed successfully");
        self.bus.publish(Event::now(EventKind::OrchestrationCompleted));

        let mut background = self.background.lock().await;

        info!("starting service discovery and event handling");
        let watcher = Arc::clone(&self.watcher);
        let watcher_ctx = ctx.clone();
        background.spawn(async move { watcher.run(watcher_ctx, filter).await });

        info!("starting health monitor");
        let monitor = Arc::clone(&self.monitor);
        let monitor_ctx = ctx.clone();
        background.spawn(async move { monitor.run(monitor_ctx).await });

        Ok(())
    }

    /// One retry-wrapped discovery pass, each attempt bounded by
    /// [`DISCOVERY_TIMEOUT`].
    async fn discover(
        &self,
        ctx: &CancellationToken,
        filter: &Filter,
    ) -> Result<Vec<ServiceEndpoint>, ServiceError> {
        let services = Arc::clone(&self.services);
        self.resilience
            .execute_with_retry(ctx, "discover", || {
                let services = Arc::clone(&services);
                async move {
                    match time::timeout(DISCOVERY_TIMEOUT, services.discover(ctx, filter)).await
                    {
                        Ok(result) => result,
                        Err(_) => Err(ServiceError::Timeout {
                            timeout: DISCOVERY_TIMEOUT,
                        }),
                    }
                }
            })
            .await
    }

    /// Waits for the background tasks to finish, bounded by `grace`.
    ///
    /// Publishes the terminal shutdown event either way; on timeout the
    /// remaining tasks are aborted.
    pub async fn drain(&self, grace: Duration) -> Result<(), OrchestrateError> {
        let mut background = self.background.lock().await;
        let all_done = async {
            while background.join_next().await.is_some() {}
        };
        let timed = time::timeout(grace, all_done).await;

        match timed {
            Ok(()) => {
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::now(EventKind::GraceExceeded));
                background.abort_all();
                Err(OrchestrateError::GraceExceeded { grace })
            }
        }
    }
}
