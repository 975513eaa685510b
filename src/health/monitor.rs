//! # Periodic health checks with two-tier remediation.
//!
//! Every tick the monitor walks the live registry, asks the probe for a
//! verdict, and escalates:
//!
//! | Verdict    | Action                                                        |
//! |------------|---------------------------------------------------------------|
//! | `HEALTHY`  | log and continue                                              |
//! | `DEGRADED` | soft restart: `stop → start`                                  |
//! | `FAILED`   | force restart: `stop → unregister → register(bare) → start`   |
//!
//! ## Rules
//! - The first scan happens one full interval after startup.
//! - A failed soft restart aborts that service's remediation only.
//! - A failed force restart leaves the service in whatever state resulted;
//!   the monitor carries on either way.
//! - Cancellation is checked every iteration; the monitor exits within one
//!   tick of the token firing.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::events::{Bus, Event, EventKind};
use crate::services::{ServiceEndpoint, ServiceRef, Services};

use super::probe::{HealthProbe, HealthStatus};

/// Periodic best-effort liveness checker.
pub struct HealthMonitor {
    services: Arc<dyn Services>,
    probe: Arc<dyn HealthProbe>,
    interval: Duration,
    bus: Bus,
}

impl HealthMonitor {
    pub fn new(
        services: Arc<dyn Services>,
        probe: Arc<dyn HealthProbe>,
        interval: Duration,
        bus: Bus,
    ) -> Self {
        Self {
            services,
            probe,
            interval,
            bus,
        }
    }

    /// Ticks until the token fires.
    pub async fn run(&self, ctx: CancellationToken) {
        info!(interval = ?self.interval, "health monitor started");
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The interval's first tick completes immediately; consume it so
        // scans start one full period in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("stopping health monitor");
                    return;
                }
                _ = ticker.tick() => self.check_and_recover(&ctx).await,
            }
        }
    }

    /// One scan over the registry: verdict, then escalation.
    async fn check_and_recover(&self, ctx: &CancellationToken) {
        debug!("performing health checks on services");
        for service in self.services.list().await {
            let status = self.probe.probe(&service, ctx).await;
            match status {
                HealthStatus::Healthy => {
                    debug!(service = service.name(), "service is healthy");
                    self.bus.publish(
                        Event::now(EventKind::ServiceHealthy).with_service(service.name()),
                    );
                }
                HealthStatus::Degraded => {
                    warn!(service = service.name(), "service is degraded, attempting restart");
                    self.bus.publish(
                        Event::now(EventKind::ServiceDegraded).with_service(service.name()),
                    );
                    self.attempt_restart(ctx, &service).await;
                }
                HealthStatus::Failed => {
                    error!(service = service.name(), "service is failing, force restarting");
                    self.bus.publish(
                        Event::now(EventKind::ServiceUnhealthy).with_service(service.name()),
                    );
                    self.force_restart(ctx, &service).await;
                }
            }
        }
    }

    /// Soft restart: `stop → start` on the existing handle.
    async fn attempt_restart(&self, ctx: &CancellationToken, service: &ServiceRef) {
        if let Err(e) = service.stop(ctx).await {
            error!(service = service.name(), error = %e, "failed to stop service");
            self.publish_restart_failed(service.name(), &e.to_string());
            return;
        }
        self.bus
            .publish(Event::now(EventKind::ServiceStopped).with_service(service.name()));

        if let Err(e) = service.start(ctx).await {
            error!(service = service.name(), error = %e, "failed to restart service");
            self.publish_restart_failed(service.name(), &e.to_string());
            return;
        }

        info!(service = service.name(), "service restarted successfully");
        self.bus
            .publish(Event::now(EventKind::ServiceRestarted).with_service(service.name()));
    }

    /// Force restart: best-effort stop, then re-register from a bare
    /// endpoint and start the fresh handle.
    async fn force_restart(&self, ctx: &CancellationToken, service: &ServiceRef) {
        warn!(service = service.name(), "force restarting service");

        if let Err(e) = service.stop(ctx).await {
            error!(service = service.name(), error = %e, "failed to stop failing service");
        } else {
            self.bus
                .publish(Event::now(EventKind::ServiceStopped).with_service(service.name()));
        }

        if let Err(e) = self.services.unregister(service.name()).await {
            error!(service = service.name(), error = %e, "failed to unregister service");
            self.publish_restart_failed(service.name(), &e.to_string());
            return;
        }
        self.bus.publish(
            Event::now(EventKind::ServiceUnregistered).with_service(service.name()),
        );

        // Original metadata is gone with the old handle; re-register from
        // name and address alone.
        let endpoint = ServiceEndpoint::bare(service.name(), service.address());

        let fresh = match self.services.register(&endpoint).await {
            Ok(s) => s,
            Err(e) => {
                error!(service = %endpoint.name, error = %e, "failed to re-register service");
                self.publish_restart_failed(&endpoint.name, &e.to_string());
                return;
            }
        };
        self.bus.publish(
            Event::now(EventKind::ServiceRegistered)
                .with_service(fresh.name())
                .with_address(fresh.address()),
        );

        if let Err(e) = fresh.start(ctx).await {
            error!(service = fresh.name(), error = %e, "failed to restart service");
            self.publish_restart_failed(fresh.name(), &e.to_string());
            return;
        }

        info!(service = fresh.name(), "service restarted successfully");
        self.bus
            .publish(Event::now(EventKind::ServiceRestarted).with_service(fresh.name()));
    }

    fn publish_restart_failed(&self, name: &str, error: &str) {
        self.bus.publish(
            Event::now(EventKind::RestartFailed)
                .with_service(name)
                .with_error(error),
        );
    }
}
