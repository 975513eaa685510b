//! # Service watcher: long-lived consumer of the membership event stream.
//!
//! The watcher turns cluster membership changes into lifecycle actions
//! while the daemon runs:
//!
//! ```text
//! services.watch(ctx, filter) ──► mpsc::Receiver<ServiceEvent>
//!                                       │
//!                  ┌── ctx.cancelled() ─┤ (select, per iteration)
//!                  ▼                    ▼
//!                exit            dispatch by kind
//!                                  ├─ ADDED    → register → initialize → start
//!                                  ├─ MODIFIED → log only
//!                                  ├─ DELETED  → log only
//!                                  └─ other    → warn with the raw kind
//! ```
//!
//! ## Rules
//! - Events from one stream are processed strictly in arrival order.
//! - Per-event failures are logged and swallowed; the loop continues.
//! - A failed `watch` call or a closed stream ends the watcher; the daemon
//!   keeps running without dynamic updates (no automatic restart).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::events::{Bus, Event, EventKind};
use crate::services::{Filter, ServiceEndpoint, ServiceEvent, ServiceEventKind, Services};

/// Long-lived consumer of the filtered membership event stream.
pub struct ServiceWatcher {
    services: Arc<dyn Services>,
    bus: Bus,
}

impl ServiceWatcher {
    pub fn new(services: Arc<dyn Services>, bus: Bus) -> Self {
        Self { services, bus }
    }

    /// Consumes the event stream until cancellation or upstream close.
    ///
    /// Without a filter the watcher disables itself: the daemon then runs
    /// on the initial batch alone.
    pub async fn run(&self, ctx: CancellationToken, filter: Option<Filter>) {
        let Some(filter) = filter else {
            warn!("no filter provided for service watcher; dynamic updates disabled");
            return;
        };

        let mut events = match self.services.watch(&ctx, &filter).await {
            Ok(rx) => rx,
            Err(e) => {
                error!(error = %e, "failed to start service watcher; continuing without dynamic updates");
                self.bus.publish(
                    Event::now(EventKind::WatcherStopped).with_error(e.to_string()),
                );
                return;
            }
        };

        info!("service watcher started");
        self.bus.publish(Event::now(EventKind::WatcherStarted));

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("stopping service watcher");
                    break;
                }
                event = events.recv() => match event {
                    Some(ev) => self.handle_event(&ctx, ev).await,
                    None => {
                        warn!("service watch stream closed");
                        self.bus.publish(Event::now(EventKind::WatchStreamClosed));
                        break;
                    }
                }
            }
        }

        self.bus.publish(Event::now(EventKind::WatcherStopped));
    }

    async fn handle_event(&self, ctx: &CancellationToken, event: ServiceEvent) {
        match event.kind {
            ServiceEventKind::Added => self.handle_added(ctx, event.endpoint).await,
            ServiceEventKind::Modified => self.handle_modified(event.endpoint),
            ServiceEventKind::Deleted => self.handle_deleted(event.endpoint),
            ServiceEventKind::Other(ref raw) => {
                warn!(kind = %raw, "unknown service event type");
            }
        }
    }

    /// Registers and starts a newly appeared endpoint.
    ///
    /// Errors are swallowed on purpose: one broken endpoint must not stall
    /// the stream.
    async fn handle_added(&self, ctx: &CancellationToken, endpoint: ServiceEndpoint) {
        info!(service = %endpoint.name, address = %endpoint.address, "adding service");
        self.bus.publish(
            Event::now(EventKind::EndpointAdded)
                .with_service(&endpoint.name)
                .with_address(&endpoint.address),
        );

        let service = match self.services.register(&endpoint).await {
            Ok(s) => s,
            Err(e) => {
                error!(service = %endpoint.name, error = %e, "failed to register service");
                self.publish_failure(&endpoint.name, &e.to_string());
                return;
            }
        };

        if let Err(e) = service.initialize().await {
            error!(service = service.name(), error = %e, "failed to initialize service");
            self.publish_failure(service.name(), &e.to_string());
            return;
        }

        if let Err(e) = service.start(ctx).await {
            error!(service = service.name(), error = %e, "failed to start service");
            self.publish_failure(service.name(), &e.to_string());
        }
    }

    fn handle_modified(&self, endpoint: ServiceEndpoint) {
        info!(service = %endpoint.name, address = %endpoint.address, "modifying service");
        self.bus.publish(
            Event::now(EventKind::EndpointModified).with_service(&endpoint.name),
        );
        // TODO: diff endpoint metadata against the registered handle and
        // restart the service when its address changes.
    }

    fn handle_deleted(&self, endpoint: ServiceEndpoint) {
        info!(service = %endpoint.name, address = %endpoint.address, "removing service");
        self.bus.publish(
            Event::now(EventKind::EndpointDeleted).with_service(&endpoint.name),
        );
        // TODO: stop and unregister the service once delete semantics are
        // settled upstream.
    }

    fn publish_failure(&self, name: &str, error: &str) {
        self.bus.publish(
            Event::now(EventKind::ServiceFailed)
                .with_service(name)
                .with_error(error),
        );
    }
}
