//! # Error types used by the orchestration runtime and the services layer.
//!
//! This module defines two main error enums:
//!
//! - [`ServiceError`] errors crossing the core → services boundary
//!   (discovery, registration, per-service lifecycle calls).
//! - [`OrchestrateError`] errors raised by the orchestration runtime itself
//!   (batch admission, shutdown).
//!
//! Both types provide `as_label` helpers for metrics. [`ServiceError`] has
//! additional methods `is_retryable()` and `is_fatal()` that the resilience
//! wrapper consults before re-invoking a boundary call.

use std::time::Duration;

use thiserror::Error;

/// # Errors crossing the orchestrator → services boundary.
///
/// Raised by discovery, registration, and per-service lifecycle calls.
/// Most variants are transient and safe to retry; `Fatal` and `Canceled`
/// are terminal, and `CircuitOpen` means the resilience layer refused the
/// call outright.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Service discovery failed.
    #[error("discovery failed: {reason}")]
    Discovery { reason: String },

    /// Registration of an endpoint was rejected by the registry.
    #[error("failed to register '{name}': {reason}")]
    Registration { name: String, reason: String },

    /// The named service is not present in the registry.
    #[error("service '{name}' not found in registry")]
    NotFound { name: String },

    /// A service failed its `initialize` step.
    #[error("failed to initialize '{name}': {reason}")]
    Initialize { name: String, reason: String },

    /// A service failed its `start` step.
    #[error("failed to start '{name}': {reason}")]
    Start { name: String, reason: String },

    /// A service failed its `stop` step.
    #[error("failed to stop '{name}': {reason}")]
    Stop { name: String, reason: String },

    /// A boundary call exceeded its timeout.
    #[error("timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Non-recoverable error (should not be retried).
    #[error("fatal error (no retry): {reason}")]
    Fatal { reason: String },

    /// The circuit breaker is open; the call was rejected without running.
    #[error("circuit breaker open; call rejected")]
    CircuitOpen,

    /// The call was canceled due to shutdown or parent cancellation.
    ///
    /// Not an error in the traditional sense; signals intentional termination.
    #[error("context canceled")]
    Canceled,
}

impl ServiceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Discovery { .. } => "service_discovery",
            ServiceError::Registration { .. } => "service_registration",
            ServiceError::NotFound { .. } => "service_not_found",
            ServiceError::Initialize { .. } => "service_initialize",
            ServiceError::Start { .. } => "service_start",
            ServiceError::Stop { .. } => "service_stop",
            ServiceError::Timeout { .. } => "service_timeout",
            ServiceError::Fatal { .. } => "service_fatal",
            ServiceError::CircuitOpen => "service_circuit_open",
            ServiceError::Canceled => "service_canceled",
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// Everything transient is retryable; `Fatal`, `CircuitOpen`, and
    /// `Canceled` are not.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ServiceError::Fatal { .. } | ServiceError::CircuitOpen | ServiceError::Canceled
        )
    }

    /// Indicates whether the error is fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServiceError::Fatal { .. })
    }
}

/// # Errors produced by the orchestration runtime.
///
/// These represent failures of a whole admission batch or of the runtime
/// shutdown sequence, as opposed to a single boundary call.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OrchestrateError {
    /// Initial discovery failed; background tasks were not launched.
    #[error("service discovery failed: {0}")]
    Discovery(#[source] ServiceError),

    /// Admission of a single endpoint failed and aborted the batch
    /// (serial and hybrid strategies are fail-fast).
    #[error("admission of '{service}' failed: {source}")]
    Admission {
        /// Endpoint whose admission aborted the batch.
        service: String,
        #[source]
        source: ServiceError,
    },

    /// One or more endpoints failed during a parallel batch.
    ///
    /// Individual failures are logged and emitted as events but deliberately
    /// not carried here; callers cannot distinguish them.
    #[error("one or more services failed to orchestrate ({failed} of {total})")]
    Batch { failed: usize, total: usize },

    /// Shutdown grace period was exceeded; background tasks were aborted.
    #[error("shutdown grace {grace:?} exceeded; background tasks aborted")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },
}

impl OrchestrateError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestrateError::Discovery(_) => "orchestrate_discovery",
            OrchestrateError::Admission { .. } => "orchestrate_admission",
            OrchestrateError::Batch { .. } => "orchestrate_batch",
            OrchestrateError::GraceExceeded { .. } => "orchestrate_grace_exceeded",
        }
    }
}
