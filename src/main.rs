//! Daemon entry point.
//!
//! Wires the frozen configuration, the event bus with its subscribers, and
//! the in-process services backend into an [`Orchestrator`], then runs
//! until SIGINT/SIGTERM/SIGQUIT:
//!
//! ```text
//! main()
//!   ├─► tracing init
//!   ├─► Bus + SubscriberSet (LogWriter, MetricsRecorder)
//!   ├─► MemoryServices seeded with the static demo endpoint
//!   ├─► Orchestrator::orchestrate(token)
//!   │     └─► initial batch, then watcher + health monitor in background
//!   ├─► wait_for_shutdown_signal()
//!   ├─► publish ShutdownRequested, cancel token
//!   ├─► Orchestrator::drain(grace)
//!   └─► services.stop_all()
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use servisor::{
    wait_for_shutdown_signal, Bus, CoreConfig, Event, EventKind, FilterConfig, LogWriter,
    MemoryServices, MetricsRecorder, Orchestrator, ServiceEndpoint, ServicePort, Services,
    StaticFactory, Subscribe, SubscriberSet,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut cfg = CoreConfig::default();
    // An empty filter matches every endpoint in the namespace and keeps the
    // watcher enabled.
    cfg.discovery.filter = Some(FilterConfig::default());

    info!(service = %cfg.service_name, "core service initializing");

    let bus = Bus::new(cfg.bus_capacity);
    let metrics = Arc::new(MetricsRecorder::new());
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter), Arc::clone(&metrics) as _];
    let subscriber_set = Arc::new(SubscriberSet::new(subscribers));
    let _listener = Arc::clone(&subscriber_set).listen(&bus);

    let services = MemoryServices::with_seeds(Arc::new(StaticFactory), demo_endpoints());

    let orchestrator = Orchestrator::new(cfg.clone(), Arc::clone(&services) as _, bus.clone());
    let token = CancellationToken::new();

    if let Err(e) = orchestrator.orchestrate(token.clone()).await {
        error!(error = %e, "initial orchestration failed");
        return ExitCode::FAILURE;
    }

    info!("core service is running");
    if let Err(e) = wait_for_shutdown_signal().await {
        error!(error = %e, "failed to listen for shutdown signals");
    }

    info!("core service shutting down");
    bus.publish(Event::now(EventKind::ShutdownRequested));
    token.cancel();

    if let Err(e) = orchestrator.drain(cfg.grace).await {
        error!(error = %e, "background tasks did not stop in time");
    }

    let stop_ctx = CancellationToken::new();
    if let Err(e) = services.stop_all(&stop_ctx).await {
        error!(error = %e, "failed to stop services");
    }

    let snapshot = metrics.snapshot();
    info!(
        registered = snapshot.registered,
        started = snapshot.started,
        failed = snapshot.failed,
        restarts = snapshot.restarts,
        "final counters"
    );

    ExitCode::SUCCESS
}

/// Static endpoint set the demo daemon orchestrates.
fn demo_endpoints() -> Vec<ServiceEndpoint> {
    let mut endpoint = ServiceEndpoint::bare("test-service", "localhost:8080");
    endpoint.version = "1.0.0".to_string();
    endpoint.ports = vec![ServicePort {
        name: "http".to_string(),
        port: 8080,
        protocol: "TCP".to_string(),
    }];
    endpoint.tags.insert("env".to_string(), "demo".to_string());
    vec![endpoint]
}
