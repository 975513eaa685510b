//! # servisor
//!
//! **Servisor** is a service-orchestration daemon core: it discovers
//! services in a cluster namespace, brings each one through the lifecycle
//! `register → initialize → start`, watches for membership changes, and
//! periodically health-checks what is running.
//!
//! ## Features
//!
//! | Area           | Description                                                       | Key types / traits                          |
//! |----------------|-------------------------------------------------------------------|---------------------------------------------|
//! | **Orchestrator** | One control loop over discovery, admission, watch, and health.  | [`Orchestrator`]                            |
//! | **Strategies** | Serial / parallel / priority-ordered admission of a batch.        | [`Strategy`], [`PriorityQueue`]             |
//! | **Watcher**    | Long-lived consumer of the membership event stream.               | [`ServiceWatcher`]                          |
//! | **Health**     | Tick-driven liveness checks with two escalation tiers.            | [`HealthMonitor`], [`HealthProbe`]          |
//! | **Services**   | The boundary the core drives; backends implement it.              | [`Services`], [`Service`], [`MemoryServices`] |
//! | **Resilience** | Retry + circuit breaker around boundary calls.                    | [`Resilience`], [`Backoff`], [`Breaker`]    |
//! | **Events**     | Broadcast bus with pluggable subscribers.                         | [`Bus`], [`Subscribe`], [`LogWriter`]       |
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use servisor::{
//!     Bus, CoreConfig, MemoryServices, Orchestrator, ServiceEndpoint, StaticFactory,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = CoreConfig::default();
//!     cfg.orchestrator.strategy = "hybrid".into();
//!
//!     let bus = Bus::new(cfg.bus_capacity);
//!     let services = MemoryServices::with_seeds(
//!         Arc::new(StaticFactory),
//!         vec![ServiceEndpoint::bare("api", "127.0.0.1:8080")],
//!     );
//!
//!     let orchestrator = Orchestrator::new(cfg, services, bus);
//!     let token = CancellationToken::new();
//!     orchestrator.orchestrate(token.clone()).await?;
//!
//!     // ... run until a shutdown signal, then:
//!     token.cancel();
//!     orchestrator.drain(std::time::Duration::from_secs(30)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ---

mod config;
mod error;
mod shutdown;
mod watcher;

pub mod events;
pub mod health;
pub mod orchestrator;
pub mod resilience;
pub mod services;
pub mod strategies;
pub mod subscribers;

// ---- Public re-exports ----

pub use config::{
    CoreConfig, DiscoveryConfig, FilterConfig, OrchestratorConfig, ResilienceConfig,
};
pub use error::{OrchestrateError, ServiceError};
pub use events::{Bus, Event, EventKind};
pub use health::{HealthMonitor, HealthProbe, HealthStatus, InitProbe};
pub use orchestrator::{Orchestrator, DISCOVERY_TIMEOUT, HEALTH_CHECK_INTERVAL};
pub use resilience::{Backoff, Breaker, Jitter, Resilience};
pub use services::{
    Filter, MemoryServices, Service, ServiceEndpoint, ServiceEvent, ServiceEventKind,
    ServiceFactory, ServicePort, ServiceRef, Services, StaticFactory, StaticService,
};
pub use shutdown::wait_for_shutdown_signal;
pub use strategies::{
    EndpointItem, HybridStrategy, ParallelStrategy, PriorityQueue, SerialStrategy, Strategy,
    DEFAULT_SERVICE_PRIORITY,
};
pub use subscribers::{LogWriter, MetricsRecorder, MetricsSnapshot, Subscribe, SubscriberSet};
pub use watcher::ServiceWatcher;
