//! # Parallel admission: one task per endpoint, barrier, aggregate error.
//!
//! Independent services should not gate each other, so every endpoint gets
//! its own admission task. The call returns only after every task finished
//! (barrier). Individual failures are logged and sent to a bounded error
//! channel sized to the batch; afterwards they collapse into a single
//! aggregated error — operators consult the logs for specifics.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::{OrchestrateError, ServiceError};
use crate::events::{Event, EventKind};
use crate::services::ServiceEndpoint;

use super::{Admission, Strategy};

/// Unordered, concurrent admission of the whole batch.
pub struct ParallelStrategy {
    admission: Admission,
}

impl ParallelStrategy {
    pub(crate) fn new(admission: Admission) -> Self {
        Self { admission }
    }
}

#[async_trait]
impl Strategy for ParallelStrategy {
    async fn orchestrate(
        &self,
        ctx: &CancellationToken,
        endpoints: &[ServiceEndpoint],
    ) -> Result<(), OrchestrateError> {
        let total = endpoints.len();
        if total == 0 {
            return Ok(());
        }

        let (tx, mut rx) = mpsc::channel::<ServiceError>(total);
        let mut tasks = JoinSet::new();

        for endpoint in endpoints.iter().cloned() {
            let admission = self.admission.clone();
            let ctx = ctx.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                if let Err(e) = admission.admit(&ctx, &endpoint).await {
                    error!(service = %endpoint.name, error = %e, "failed to orchestrate service");
                    admission.bus().publish(
                        Event::now(EventKind::ServiceFailed)
                            .with_service(&endpoint.name)
                            .with_error(e.to_string()),
                    );
                    // Channel is sized to the batch; a send cannot fail here.
                    let _ = tx.try_send(e);
                }
            });
        }
        drop(tx);

        // Barrier: every admission task finishes before we tally.
        while tasks.join_next().await.is_some() {}

        let mut failed = 0;
        while rx.try_recv().is_ok() {
            failed += 1;
        }

        if failed > 0 {
            Err(OrchestrateError::Batch { failed, total })
        } else {
            Ok(())
        }
    }
}
