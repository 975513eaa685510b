//! # Frozen daemon configuration.
//!
//! [`CoreConfig`] is assembled once at startup and read-only thereafter.
//! It selects the discovery filter, the admission strategy, the priority
//! knobs consumed by the hybrid strategy, and the runtime knobs the daemon
//! itself needs (shutdown grace, bus capacity, retry/breaker settings).
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use servisor::CoreConfig;
//!
//! let mut cfg = CoreConfig::default();
//! cfg.orchestrator.strategy = "hybrid".into();
//! cfg.orchestrator.priority_map.insert("billing".into(), 5);
//! cfg.grace = Duration::from_secs(10);
//!
//! assert_eq!(cfg.orchestrator.priority_tag, "priority");
//! assert_eq!(cfg.orchestrator.default_priority, 99);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use crate::resilience::Backoff;

/// Root configuration for the orchestration daemon.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    /// Name of this daemon instance (logging only).
    pub service_name: String,
    /// Discovery settings.
    pub discovery: DiscoveryConfig,
    /// Admission strategy settings.
    pub orchestrator: OrchestratorConfig,
    /// Boundary-call retry and circuit breaker settings.
    pub resilience: ResilienceConfig,
    /// Maximum time to wait for background tasks during shutdown.
    pub grace: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for CoreConfig {
    /// Provides a default configuration:
    /// - no discovery filter (dynamic updates disabled until one is set)
    /// - empty strategy (falls back to serial with a warning)
    /// - `grace = 30s`, `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            service_name: "servisor".to_string(),
            discovery: DiscoveryConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            resilience: ResilienceConfig::default(),
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

/// Discovery settings: which endpoints the daemon considers its own.
#[derive(Clone, Debug, Default)]
pub struct DiscoveryConfig {
    /// Label/tag filter applied to discovery and the watch stream.
    ///
    /// `None` disables the watcher (the daemon runs without dynamic
    /// updates); discovery then matches every endpoint in the namespace.
    pub filter: Option<FilterConfig>,
}

/// Label/tag selector built into a [`Filter`](crate::services::Filter).
///
/// An endpoint matches iff every pair in both maps is present on it.
#[derive(Clone, Debug, Default)]
pub struct FilterConfig {
    pub labels: HashMap<String, String>,
    pub tags: HashMap<String, String>,
}

/// Admission strategy settings.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// One of `""`, `"serial"`, `"parallel"`, `"hybrid"`.
    ///
    /// Unknown or empty values fall back to serial with a warning.
    pub strategy: String,
    /// Operator-pinned priorities by service name; wins over any priority
    /// derived from endpoint metadata.
    pub priority_map: HashMap<String, i64>,
    /// Endpoint tag the hybrid strategy reads an explicit priority from.
    pub priority_tag: String,
    /// Priority assigned when nothing else applies.
    pub default_priority: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            strategy: String::new(),
            priority_map: HashMap::new(),
            priority_tag: "priority".to_string(),
            default_priority: 99,
        }
    }
}

/// Retry and circuit breaker settings for boundary calls.
#[derive(Clone, Debug)]
pub struct ResilienceConfig {
    /// Maximum attempts per boundary call (first try included).
    pub max_attempts: u32,
    /// Delay policy between attempts.
    pub backoff: Backoff,
    /// Consecutive failures before the breaker opens.
    pub breaker_threshold: u32,
    /// How long the breaker stays open before allowing a trial call.
    pub breaker_cooldown: Duration,
}

impl Default for ResilienceConfig {
    /// Defaults: 3 attempts, 100ms starting backoff, breaker at 5 failures
    /// with a 30-second cooldown.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
            breaker_threshold: 5,
            breaker_cooldown: Duration::from_secs(30),
        }
    }
}
