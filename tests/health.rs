//! Health monitor escalation: soft restarts for degraded services, force
//! restarts with re-registration for failed ones.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use common::{endpoints, wait_until, CallLog, Recorder, StubFactory};
use servisor::{
    Bus, CoreConfig, FilterConfig, HealthMonitor, HealthProbe, HealthStatus,
    MemoryServices, Orchestrator, ServiceRef, Services,
};

#[tokio::test(start_paused = true)]
async fn failed_probe_triggers_force_restart_in_order() {
    let log = CallLog::new();
    // Admission initializes once, the first tick's probe once more; the
    // second tick's probe exhausts the budget and fails.
    let factory = StubFactory::new(Arc::clone(&log)).init_budget("a", 2);
    let inner = MemoryServices::with_seeds(Arc::new(factory), endpoints(&["a"]));
    let services = Recorder::new(Arc::clone(&log), inner);

    let mut cfg = CoreConfig::default();
    cfg.discovery.filter = Some(FilterConfig::default());
    cfg.orchestrator.strategy = "serial".to_string();
    cfg.resilience.max_attempts = 1;

    let bus = Bus::new(cfg.bus_capacity);
    let orchestrator =
        Orchestrator::new(cfg, Arc::clone(&services) as Arc<dyn Services>, bus);
    let token = CancellationToken::new();
    orchestrator.orchestrate(token.clone()).await.unwrap();

    let log_ref = Arc::clone(&log);
    wait_until(Duration::from_secs(60), move || {
        log_ref.contains("unregister:a")
    })
    .await;
    token.cancel();
    orchestrator.drain(Duration::from_secs(15)).await.unwrap();

    // Escalation order around the first force restart:
    // stop → unregister → register(bare) → start.
    let calls = log.calls();
    let at = log.position("unregister:a").unwrap();
    assert_eq!(calls[at - 1], "stop:a");
    assert_eq!(calls[at + 1], "register:a");
    // Force restart skips initialize on the fresh handle.
    assert_eq!(calls[at + 2], "start:a");
}

/// Probe that reports DEGRADED once, then HEALTHY.
struct DegradeOnce {
    tripped: AtomicBool,
}

#[async_trait]
impl HealthProbe for DegradeOnce {
    async fn probe(&self, _service: &ServiceRef, _ctx: &CancellationToken) -> HealthStatus {
        if self.tripped.swap(true, Ordering::SeqCst) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}

#[tokio::test(start_paused = true)]
async fn degraded_probe_triggers_soft_restart() {
    let log = CallLog::new();
    let inner = MemoryServices::new(Arc::new(StubFactory::new(Arc::clone(&log))));
    let services = Recorder::new(Arc::clone(&log), inner);
    services
        .register(&servisor::ServiceEndpoint::bare("a", "10.0.0.1:80"))
        .await
        .unwrap();

    let monitor = HealthMonitor::new(
        Arc::clone(&services) as Arc<dyn Services>,
        Arc::new(DegradeOnce {
            tripped: AtomicBool::new(false),
        }),
        Duration::from_secs(10),
        Bus::new(64),
    );

    let token = CancellationToken::new();
    let ctx = token.clone();
    let handle = tokio::spawn(async move { monitor.run(ctx).await });

    let log_ref = Arc::clone(&log);
    wait_until(Duration::from_secs(60), move || log_ref.contains("start:a")).await;
    token.cancel();
    handle.await.unwrap();

    // Soft restart touches only the existing handle: stop then start,
    // no re-registration.
    let stop = log.position("stop:a").unwrap();
    let start = log.position("start:a").unwrap();
    assert!(stop < start);
    assert!(!log.contains("unregister:a"));
    assert_eq!(log.count_of("register:a"), 1);
}

/// Probe that always reports HEALTHY.
struct AlwaysHealthy;

#[async_trait]
impl HealthProbe for AlwaysHealthy {
    async fn probe(&self, _service: &ServiceRef, _ctx: &CancellationToken) -> HealthStatus {
        HealthStatus::Healthy
    }
}

#[tokio::test(start_paused = true)]
async fn healthy_services_are_left_alone() {
    let log = CallLog::new();
    let inner = MemoryServices::new(Arc::new(StubFactory::new(Arc::clone(&log))));
    let services = Recorder::new(Arc::clone(&log), inner);
    services
        .register(&servisor::ServiceEndpoint::bare("a", "10.0.0.1:80"))
        .await
        .unwrap();

    let bus = Bus::new(64);
    let mut events = bus.subscribe();
    let monitor = HealthMonitor::new(
        Arc::clone(&services) as Arc<dyn Services>,
        Arc::new(AlwaysHealthy),
        Duration::from_secs(10),
        bus,
    );

    let token = CancellationToken::new();
    let ctx = token.clone();
    let handle = tokio::spawn(async move { monitor.run(ctx).await });

    // Let a few scans pass, then verify nothing was restarted.
    wait_until(Duration::from_secs(60), move || {
        matches!(
            events.try_recv(),
            Ok(servisor::Event {
                kind: servisor::EventKind::ServiceHealthy,
                ..
            })
        )
    })
    .await;
    token.cancel();
    handle.await.unwrap();

    assert!(!log.contains("stop:a"));
    assert_eq!(log.count_of("register:a"), 1);
}
