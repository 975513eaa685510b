//! # Service handle and factory abstractions.
//!
//! Defines the lifecycle surface the core drives for each discovered
//! endpoint:
//!
//! - **[`Service`]** — trait for a registered, lifecycle-managed handle
//! - **[`ServiceRef`]** — shared handle (`Arc<dyn Service>`) owned by the
//!   registry; the core holds non-owning clones
//! - **[`ServiceFactory`]** — builds a [`Service`] from a [`ServiceEndpoint`]
//!
//! ## Rules
//! - `start`/`stop` receive a [`CancellationToken`] and **must** observe it
//!   to enable graceful shutdown.
//! - `initialize` is also the placeholder health signal, so it must be safe
//!   to call repeatedly on a running service.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;

use super::endpoint::ServiceEndpoint;

/// Shared handle to a service object.
pub type ServiceRef = Arc<dyn Service>;

/// A registered, lifecycle-managed handle backed by an endpoint.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns the stable service name (the registry key).
    fn name(&self) -> &str;

    /// Returns the endpoint address the handle was built from.
    fn address(&self) -> &str;

    /// Prepares the service for startup.
    ///
    /// Must be repeatable: the health monitor re-invokes it as a liveness
    /// probe while the service is running.
    async fn initialize(&self) -> Result<(), ServiceError>;

    /// Starts the service.
    async fn start(&self, ctx: &CancellationToken) -> Result<(), ServiceError>;

    /// Stops the service.
    async fn stop(&self, ctx: &CancellationToken) -> Result<(), ServiceError>;
}

/// Builds concrete [`Service`] handles from discovered endpoints.
pub trait ServiceFactory: Send + Sync + 'static {
    fn create(&self, endpoint: &ServiceEndpoint) -> Result<ServiceRef, ServiceError>;
}
