//! # In-process services backend.
//!
//! [`MemoryServices`] implements the [`Services`] boundary against local
//! state: a seeded endpoint set for discovery, a concurrent registry map,
//! and per-watcher event sinks. The daemon binary, demos, and tests run
//! against it; a cluster backend implements the same trait.
//!
//! ## Rules
//! - Registration replaces an existing handle under the same name
//!   (MODIFIED semantics never duplicate entries).
//! - Each `watch` call gets its own bounded sink; events are delivered to
//!   every sink whose filter matches the endpoint.
//! - A sink is pruned when its watcher cancels or drops the receiver, which
//!   closes the stream deterministically.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use async_trait::async_trait;

use crate::error::ServiceError;

use super::endpoint::{Filter, ServiceEndpoint};
use super::event::ServiceEvent;
use super::service::{Service, ServiceFactory, ServiceRef};
use super::Services;

/// Capacity of each per-watcher event sink.
const WATCH_SINK_CAPACITY: usize = 64;

struct WatchSink {
    filter: Filter,
    tx: mpsc::Sender<ServiceEvent>,
    ctx: CancellationToken,
}

/// Local, in-process implementation of [`Services`].
pub struct MemoryServices {
    factory: Arc<dyn ServiceFactory>,
    seeds: RwLock<Vec<ServiceEndpoint>>,
    registry: DashMap<String, ServiceRef>,
    sinks: Mutex<Vec<WatchSink>>,
}

impl MemoryServices {
    /// Creates an empty backend around the given factory.
    pub fn new(factory: Arc<dyn ServiceFactory>) -> Arc<Self> {
        Self::with_seeds(factory, Vec::new())
    }

    /// Creates a backend whose discovery answers with `seeds`.
    pub fn with_seeds(
        factory: Arc<dyn ServiceFactory>,
        seeds: Vec<ServiceEndpoint>,
    ) -> Arc<Self> {
        Arc::new(Self {
            factory,
            seeds: RwLock::new(seeds),
            registry: DashMap::new(),
            sinks: Mutex::new(Vec::new()),
        })
    }

    /// Adds an endpoint to the discovery set.
    pub async fn seed(&self, endpoint: ServiceEndpoint) {
        self.seeds.write().await.push(endpoint);
    }

    /// Delivers a membership event to every watcher whose filter matches.
    ///
    /// Sinks whose watcher has cancelled or hung up are pruned here; a full
    /// sink drops the event for that watcher only.
    pub async fn push_event(&self, event: ServiceEvent) {
        let mut sinks = self.sinks.lock().await;
        sinks.retain(|s| !s.ctx.is_cancelled() && !s.tx.is_closed());
        for sink in sinks.iter() {
            if !sink.filter.matches(&event.endpoint) {
                continue;
            }
            if sink.tx.try_send(event.clone()).is_err() {
                warn!(
                    service = %event.endpoint.name,
                    "watch sink full or closed; dropping membership event"
                );
            }
        }
    }

    async fn prune_sinks(&self) {
        let mut sinks = self.sinks.lock().await;
        sinks.retain(|s| !s.ctx.is_cancelled() && !s.tx.is_closed());
    }
}

#[async_trait]
impl Services for MemoryServices {
    async fn discover(
        &self,
        _ctx: &CancellationToken,
        filter: &Filter,
    ) -> Result<Vec<ServiceEndpoint>, ServiceError> {
        let seeds = self.seeds.read().await;
        Ok(seeds.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    async fn watch(
        &self,
        ctx: &CancellationToken,
        filter: &Filter,
    ) -> Result<mpsc::Receiver<ServiceEvent>, ServiceError> {
        let (tx, rx) = mpsc::channel(WATCH_SINK_CAPACITY);
        {
            let mut sinks = self.sinks.lock().await;
            sinks.push(WatchSink {
                filter: filter.clone(),
                tx,
                ctx: ctx.clone(),
            });
        }
        debug!("watch sink registered");
        Ok(rx)
    }

    async fn create_service(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<ServiceRef, ServiceError> {
        self.factory.create(endpoint)
    }

    async fn register(&self, endpoint: &ServiceEndpoint) -> Result<ServiceRef, ServiceError> {
        let service = self.create_service(endpoint).await?;
        // Replaces any handle already recorded under this name.
        self.registry
            .insert(endpoint.name.clone(), Arc::clone(&service));
        Ok(service)
    }

    async fn unregister(&self, name: &str) -> Result<(), ServiceError> {
        self.registry
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound {
                name: name.to_string(),
            })
    }

    async fn list(&self) -> Vec<ServiceRef> {
        self.registry.iter().map(|e| Arc::clone(e.value())).collect()
    }

    async fn stop_all(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.prune_sinks().await;
        let mut failed: Vec<String> = Vec::new();
        for service in self.list().await {
            if let Err(e) = service.stop(ctx).await {
                warn!(service = service.name(), error = %e, "failed to stop service");
                failed.push(service.name().to_string());
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Stop {
                name: failed.join(","),
                reason: "stop_all left services running".to_string(),
            })
        }
    }
}

/// Minimal [`Service`] that only logs its lifecycle transitions.
///
/// Stands in for real workloads in the daemon binary and demos.
pub struct StaticService {
    endpoint: ServiceEndpoint,
}

impl StaticService {
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl Service for StaticService {
    fn name(&self) -> &str {
        &self.endpoint.name
    }

    fn address(&self) -> &str {
        &self.endpoint.address
    }

    async fn initialize(&self) -> Result<(), ServiceError> {
        debug!(service = %self.endpoint.name, "initializing");
        Ok(())
    }

    async fn start(&self, _ctx: &CancellationToken) -> Result<(), ServiceError> {
        info!(service = %self.endpoint.name, address = %self.endpoint.address, "starting");
        Ok(())
    }

    async fn stop(&self, _ctx: &CancellationToken) -> Result<(), ServiceError> {
        info!(service = %self.endpoint.name, "stopping");
        Ok(())
    }
}

/// Factory producing [`StaticService`] handles.
pub struct StaticFactory;

impl ServiceFactory for StaticFactory {
    fn create(&self, endpoint: &ServiceEndpoint) -> Result<ServiceRef, ServiceError> {
        Ok(Arc::new(StaticService::new(endpoint.clone())))
    }
}
