//! # Serial admission: input order, fail-fast.
//!
//! Admits endpoints one at a time in the order discovery produced them.
//! The first failed admission aborts the whole batch and is returned, so
//! ordered startups stop at the first broken dependency instead of racing
//! past it.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::OrchestrateError;
use crate::services::ServiceEndpoint;

use super::{Admission, Strategy};

/// Strict in-order admission.
pub struct SerialStrategy {
    admission: Admission,
}

impl SerialStrategy {
    pub(crate) fn new(admission: Admission) -> Self {
        Self { admission }
    }
}

#[async_trait]
impl Strategy for SerialStrategy {
    async fn orchestrate(
        &self,
        ctx: &CancellationToken,
        endpoints: &[ServiceEndpoint],
    ) -> Result<(), OrchestrateError> {
        for endpoint in endpoints {
            info!(service = %endpoint.name, mode = "serial", "orchestrating service");
            if let Err(e) = self.admission.admit(ctx, endpoint).await {
                error!(service = %endpoint.name, error = %e, "admission failed; aborting batch");
                return Err(OrchestrateError::Admission {
                    service: endpoint.name.clone(),
                    source: e,
                });
            }
        }
        Ok(())
    }
}
