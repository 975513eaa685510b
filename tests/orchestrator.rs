//! End-to-end scenarios for the orchestrator and its admission strategies,
//! driven through the recording services wrapper.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::{endpoints, wait_until, CallLog, Recorder, StubFactory};
use servisor::{
    Bus, CoreConfig, FilterConfig, MemoryServices, OrchestrateError, Orchestrator,
    ServiceEvent, Services,
};

struct Harness {
    log: Arc<CallLog>,
    services: Arc<Recorder>,
    orchestrator: Orchestrator,
    token: CancellationToken,
}

/// Wires a recorder-backed orchestrator with single-attempt retries so
/// call sequences map one-to-one onto lifecycle steps.
fn harness(strategy: &str, factory: StubFactory, seeds: Vec<servisor::ServiceEndpoint>) -> Harness {
    let log = factory.log_handle();
    let inner = MemoryServices::with_seeds(Arc::new(factory), seeds);
    let services = Recorder::new(Arc::clone(&log), inner);

    let mut cfg = CoreConfig::default();
    cfg.discovery.filter = Some(FilterConfig::default());
    cfg.orchestrator.strategy = strategy.to_string();
    cfg.resilience.max_attempts = 1;

    let bus = Bus::new(cfg.bus_capacity);
    let orchestrator = Orchestrator::new(cfg, Arc::clone(&services) as Arc<dyn Services>, bus);

    Harness {
        log,
        services,
        orchestrator,
        token: CancellationToken::new(),
    }
}

#[tokio::test(start_paused = true)]
async fn empty_discovery_still_launches_background_tasks() {
    let log = CallLog::new();
    let h = harness("serial", StubFactory::new(Arc::clone(&log)), Vec::new());

    h.orchestrator.orchestrate(h.token.clone()).await.unwrap();

    // No endpoints, no lifecycle calls; only the boundary calls happened.
    let calls = h.log.calls();
    assert!(calls.contains(&"discover".to_string()));
    assert!(calls.iter().all(|c| c == "discover" || c == "watch"));

    // The watcher is live: a late endpoint still gets admitted.
    wait_until(Duration::from_secs(5), || h.log.contains("watch")).await;
    h.services
        .inner
        .push_event(ServiceEvent::added(servisor::ServiceEndpoint::bare(
            "late", "10.0.0.9:80",
        )))
        .await;
    wait_until(Duration::from_secs(5), || h.log.contains("start:late")).await;

    h.token.cancel();
    h.orchestrator.drain(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn serial_admits_in_discovery_order() {
    let log = CallLog::new();
    let h = harness(
        "serial",
        StubFactory::new(Arc::clone(&log)),
        endpoints(&["a", "b", "c"]),
    );

    h.orchestrator.orchestrate(h.token.clone()).await.unwrap();

    let lifecycle: Vec<String> = h
        .log
        .calls()
        .into_iter()
        .filter(|c| c != "discover" && c != "watch")
        .collect();
    assert_eq!(
        lifecycle,
        vec![
            "register:a",
            "initialize:a",
            "start:a",
            "register:b",
            "initialize:b",
            "start:b",
            "register:c",
            "initialize:c",
            "start:c",
        ]
    );

    h.token.cancel();
    h.orchestrator.drain(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn serial_aborts_batch_on_first_failure() {
    let log = CallLog::new();
    let h = harness(
        "serial",
        StubFactory::new(Arc::clone(&log)).failing_init("b"),
        endpoints(&["a", "b", "c"]),
    );

    let err = h.orchestrator.orchestrate(h.token.clone()).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestrateError::Admission { ref service, .. } if service == "b"
    ));

    // The failing endpoint aborted the batch: c was never touched, and the
    // background tasks were not launched.
    assert!(h.log.contains("register:b"));
    assert!(!h.log.contains("register:c"));
    assert!(!h.log.contains("watch"));
}

#[tokio::test(start_paused = true)]
async fn parallel_runs_every_endpoint_and_aggregates_failures() {
    let log = CallLog::new();
    let h = harness(
        "parallel",
        StubFactory::new(Arc::clone(&log))
            .failing_start("b")
            .failing_start("d"),
        endpoints(&["a", "b", "c", "d", "e"]),
    );

    let err = h.orchestrator.orchestrate(h.token.clone()).await.unwrap_err();
    assert!(matches!(err, OrchestrateError::Batch { failed: 2, total: 5 }));

    // Barrier semantics: every endpoint was attempted exactly once.
    assert_eq!(h.log.count_prefix("register:"), 5);
    assert_eq!(h.log.count_prefix("start:"), 5);
    for name in ["a", "b", "c", "d", "e"] {
        assert_eq!(h.log.count_of(&format!("start:{name}")), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn hybrid_admits_in_priority_order() {
    let log = CallLog::new();
    let mut seeds = endpoints(&["x", "y", "z"]);
    seeds[0].tags.insert("priority".into(), "10".into());
    seeds[1].version = "1.0.0".into();

    let h = harness("hybrid", StubFactory::new(Arc::clone(&log)), seeds);
    h.orchestrator.orchestrate(h.token.clone()).await.unwrap();

    // x pinned at 10, z defaults to 99, y derives 100 from its version.
    assert_eq!(
        h.log.with_prefix("register:"),
        vec!["register:x", "register:z", "register:y"]
    );

    h.token.cancel();
    h.orchestrator.drain(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unknown_strategy_falls_back_to_serial() {
    let log = CallLog::new();
    let h = harness(
        "round-robin",
        StubFactory::new(Arc::clone(&log)),
        endpoints(&["a", "b"]),
    );

    h.orchestrator.orchestrate(h.token.clone()).await.unwrap();
    assert_eq!(
        h.log.with_prefix("register:"),
        vec!["register:a", "register:b"]
    );

    h.token.cancel();
    h.orchestrator.drain(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_background_tasks_within_grace() {
    let log = CallLog::new();
    let h = harness("serial", StubFactory::new(Arc::clone(&log)), endpoints(&["a"]));

    h.orchestrator.orchestrate(h.token.clone()).await.unwrap();
    wait_until(Duration::from_secs(5), || h.log.contains("watch")).await;

    h.token.cancel();
    // One tick interval plus one blocking call bounds the exit.
    h.orchestrator.drain(Duration::from_secs(15)).await.unwrap();
}
