//! # Retry-wrapped execution of boundary calls.
//!
//! [`Resilience`] is the higher-order wrapper call sites reach for when a
//! call crosses the orchestrator → services boundary: it re-invokes the
//! operation on retryable errors with backoff delays, consults the circuit
//! breaker before every attempt, and emits [`RetryScheduled`] /
//! [`BreakerOpened`] / [`BreakerClosed`] events.
//!
//! ## Rules
//! - `Fatal` and `Canceled` errors pass through untouched.
//! - Sleeps between attempts are cancellable; cancellation surfaces as
//!   [`ServiceError::Canceled`].
//! - Strategies hold no hidden retry state; everything funnels through
//!   [`Resilience::execute_with_retry`].
//!
//! [`RetryScheduled`]: crate::events::EventKind::RetryScheduled
//! [`BreakerOpened`]: crate::events::EventKind::BreakerOpened
//! [`BreakerClosed`]: crate::events::EventKind::BreakerClosed

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ResilienceConfig;
use crate::error::ServiceError;
use crate::events::{Bus, Event, EventKind};

use super::backoff::Backoff;
use super::breaker::{Breaker, BreakerTransition};

/// Retry + circuit breaker wrapper shared by every boundary call site.
pub struct Resilience {
    max_attempts: u32,
    backoff: Backoff,
    breaker: Breaker,
    bus: Bus,
}

impl Resilience {
    /// Builds the wrapper from frozen configuration.
    pub fn new(cfg: &ResilienceConfig, bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            max_attempts: cfg.max_attempts.max(1),
            backoff: cfg.backoff,
            breaker: Breaker::new(cfg.breaker_threshold, cfg.breaker_cooldown),
            bus,
        })
    }

    /// Runs `op`, retrying retryable failures up to the attempt budget.
    ///
    /// `what` names the operation for logs and events (usually the service
    /// name or `"discover"`).
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        ctx: &CancellationToken,
        what: &str,
        mut op: F,
    ) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut prev_delay: Option<Duration> = None;
        let mut attempt: u32 = 0;

        loop {
            if ctx.is_cancelled() {
                return Err(ServiceError::Canceled);
            }
            if !self.breaker.allow() {
                return Err(ServiceError::CircuitOpen);
            }

            attempt += 1;
            match op().await {
                Ok(value) => {
                    if let Some(t) = self.breaker.record_success() {
                        self.note_transition(what, t);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    if let Some(t) = self.breaker.record_failure() {
                        self.note_transition(what, t);
                    }
                    let delay = self.backoff.next(prev_delay);
                    prev_delay = Some(delay);
                    warn!(
                        op = what,
                        attempt,
                        delay = ?delay,
                        error = %e,
                        "boundary call failed; retrying"
                    );
                    self.bus.publish(
                        Event::now(EventKind::RetryScheduled)
                            .with_service(what)
                            .with_attempt(u64::from(attempt))
                            .with_delay(delay)
                            .with_error(e.to_string()),
                    );
                    tokio::select! {
                        _ = time::sleep(delay) => {}
                        _ = ctx.cancelled() => return Err(ServiceError::Canceled),
                    }
                }
                Err(e) => {
                    if !matches!(e, ServiceError::Canceled) {
                        if let Some(t) = self.breaker.record_failure() {
                            self.note_transition(what, t);
                        }
                    }
                    return Err(e);
                }
            }
        }
    }

    fn note_transition(&self, what: &str, transition: BreakerTransition) {
        match transition {
            BreakerTransition::Opened => {
                warn!(op = what, "circuit breaker opened");
                self.bus
                    .publish(Event::now(EventKind::BreakerOpened).with_service(what));
            }
            BreakerTransition::Closed => {
                info!(op = what, "circuit breaker closed");
                self.bus
                    .publish(Event::now(EventKind::BreakerClosed).with_service(what));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn wrapper(max_attempts: u32) -> Arc<Resilience> {
        let cfg = ResilienceConfig {
            max_attempts,
            backoff: Backoff {
                first: Duration::from_millis(10),
                max: Duration::from_millis(50),
                factor: 2.0,
                jitter: crate::resilience::Jitter::None,
            },
            breaker_threshold: 0,
            breaker_cooldown: Duration::ZERO,
        };
        Resilience::new(&cfg, Bus::new(16))
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let res = wrapper(5);
        let ctx = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let out = res
            .execute_with_retry(&ctx, "flaky", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ServiceError::Start {
                        name: "flaky".into(),
                        reason: "not yet".into(),
                    })
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(out.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_return_last_error() {
        let res = wrapper(3);
        let ctx = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let out: Result<(), _> = res
            .execute_with_retry(&ctx, "down", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Initialize {
                    name: "down".into(),
                    reason: "refused".into(),
                })
            })
            .await;

        assert!(matches!(out.unwrap_err(), ServiceError::Initialize { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let res = wrapper(5);
        let ctx = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let out: Result<(), _> = res
            .execute_with_retry(&ctx, "broken", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Fatal {
                    reason: "unrecoverable".into(),
                })
            })
            .await;

        assert!(out.unwrap_err().is_fatal());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let res = wrapper(5);
        let ctx = CancellationToken::new();
        ctx.cancel();

        let out: Result<(), _> = res
            .execute_with_retry(&ctx, "gone", || async { Ok(()) })
            .await;
        assert!(matches!(out.unwrap_err(), ServiceError::Canceled));
    }
}
