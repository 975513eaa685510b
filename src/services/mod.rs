//! # The services layer the core consumes.
//!
//! The orchestrator, strategies, watcher, and health monitor never talk to
//! a concrete backend; they drive the [`Services`] trait. A backend owns
//! the [`Service`] instances it hands out; the core keeps non-owning
//! [`ServiceRef`] clones and no mirror of the registry.
//!
//! ## Contents
//! - [`ServiceEndpoint`], [`ServicePort`], [`Filter`] — discovery data model
//! - [`Service`], [`ServiceRef`], [`ServiceFactory`] — lifecycle surface
//! - [`ServiceEvent`], [`ServiceEventKind`] — watch stream payloads
//! - [`Services`] — the boundary trait
//! - [`MemoryServices`] — in-process backend for the daemon binary and tests

mod endpoint;
mod event;
mod memory;
mod service;

pub use endpoint::{Filter, ServiceEndpoint, ServicePort};
pub use event::{ServiceEvent, ServiceEventKind};
pub use memory::{MemoryServices, StaticFactory, StaticService};
pub use service::{Service, ServiceFactory, ServiceRef};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;

/// Registry, factory, discovery, and watch surface consumed by the core.
///
/// ## Contract
/// - `register` is atomic and idempotent per name: re-registering an
///   existing name replaces the handle, never duplicates it.
/// - The receiver returned by `watch` delivers events strictly in arrival
///   order and closes when the watch terminates (cancellation or upstream
///   close).
#[async_trait]
pub trait Services: Send + Sync + 'static {
    /// Returns every endpoint in the namespace matching `filter`.
    async fn discover(
        &self,
        ctx: &CancellationToken,
        filter: &Filter,
    ) -> Result<Vec<ServiceEndpoint>, ServiceError>;

    /// Opens a stream of membership events matching `filter`.
    async fn watch(
        &self,
        ctx: &CancellationToken,
        filter: &Filter,
    ) -> Result<mpsc::Receiver<ServiceEvent>, ServiceError>;

    /// Builds a service handle without registering it.
    async fn create_service(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<ServiceRef, ServiceError>;

    /// Builds a service handle and records it under the endpoint name.
    async fn register(&self, endpoint: &ServiceEndpoint) -> Result<ServiceRef, ServiceError>;

    /// Removes the named service from the registry.
    async fn unregister(&self, name: &str) -> Result<(), ServiceError>;

    /// Returns handles for every registered service.
    async fn list(&self) -> Vec<ServiceRef>;

    /// Stops every registered service, best-effort.
    async fn stop_all(&self, ctx: &CancellationToken) -> Result<(), ServiceError>;
}
