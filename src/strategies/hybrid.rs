//! # Hybrid admission: priority-ordered drain of a min-heap.
//!
//! Each endpoint's priority is resolved at orchestration time:
//!
//! 1. an operator-pinned entry in the configured priority map;
//! 2. else the priority tag on the endpoint, parsed as an integer;
//! 3. else, for a valid semver version, `major*100 + minor*10 + patch`
//!    when that lands above zero;
//! 4. else the configured default (99).
//!
//! All endpoints are pushed into the [`PriorityQueue`] and drained lowest
//! priority first; ties drain in discovery order. Like serial admission,
//! the first failure aborts the remaining drain.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::OrchestratorConfig;
use crate::error::OrchestrateError;
use crate::services::ServiceEndpoint;

use super::queue::PriorityQueue;
use super::{Admission, Strategy};

/// Priority-ordered admission.
pub struct HybridStrategy {
    admission: Admission,
    priority_map: HashMap<String, i64>,
    priority_tag: String,
    default_priority: i64,
}

impl HybridStrategy {
    pub(crate) fn new(admission: Admission, cfg: &OrchestratorConfig) -> Self {
        Self {
            admission,
            priority_map: cfg.priority_map.clone(),
            priority_tag: cfg.priority_tag.clone(),
            default_priority: cfg.default_priority,
        }
    }

    /// Resolves every endpoint's priority into one map for the queue.
    fn derive_priorities(&self, endpoints: &[ServiceEndpoint]) -> HashMap<String, i64> {
        endpoints
            .iter()
            .map(|e| (e.name.clone(), self.priority_for(e)))
            .collect()
    }

    fn priority_for(&self, endpoint: &ServiceEndpoint) -> i64 {
        if let Some(pinned) = self.priority_map.get(&endpoint.name) {
            return *pinned;
        }
        if let Some(raw) = endpoint.tags.get(&self.priority_tag) {
            if let Ok(parsed) = raw.parse::<i64>() {
                return parsed;
            }
        }
        if !endpoint.version.is_empty() {
            if let Some(p) = version_priority(&endpoint.version) {
                if p > 0 {
                    return p;
                }
            }
        }
        self.default_priority
    }
}

/// Maps a semver string onto a priority level.
fn version_priority(version: &str) -> Option<i64> {
    let v = semver::Version::parse(version).ok()?;
    Some((v.major * 100 + v.minor * 10 + v.patch) as i64)
}

#[async_trait]
impl Strategy for HybridStrategy {
    async fn orchestrate(
        &self,
        ctx: &CancellationToken,
        endpoints: &[ServiceEndpoint],
    ) -> Result<(), OrchestrateError> {
        if endpoints.is_empty() {
            warn!("no endpoints provided for orchestration");
            return Ok(());
        }

        let mut queue = PriorityQueue::new(
            self.derive_priorities(endpoints),
            self.default_priority,
        );
        for endpoint in endpoints {
            queue.push(endpoint.clone());
        }

        while let Some(item) = queue.pop() {
            info!(
                service = %item.endpoint.name,
                priority = item.priority,
                mode = "hybrid",
                "orchestrating service"
            );
            if let Err(e) = self.admission.admit(ctx, &item.endpoint).await {
                error!(
                    service = %item.endpoint.name,
                    error = %e,
                    "admission failed; aborting priority drain"
                );
                return Err(OrchestrateError::Admission {
                    service: item.endpoint.name.clone(),
                    source: e,
                });
            }
        }
        Ok(())
    }
}
