//! Shared test doubles: a recording services wrapper around the in-memory
//! backend, plus scriptable stub services.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use servisor::{
    Filter, MemoryServices, Service, ServiceEndpoint, ServiceError, ServiceEvent,
    ServiceFactory, ServiceRef, Services,
};

/// Append-only record of every boundary and lifecycle call, in order.
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == call)
    }

    pub fn count_of(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Index of the first occurrence, if any.
    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls.lock().unwrap().iter().position(|c| c == call)
    }

    /// Calls matching a prefix, in order.
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// Scriptable service: records every lifecycle call and fails on cue.
pub struct StubService {
    name: String,
    address: String,
    log: Arc<CallLog>,
    fail_init: bool,
    fail_start: bool,
    /// Remaining successful initializes, shared across re-created handles.
    init_budget: Option<Arc<Mutex<i64>>>,
}

#[async_trait]
impl Service for StubService {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn initialize(&self) -> Result<(), ServiceError> {
        self.log.record(format!("initialize:{}", self.name));
        if let Some(budget) = &self.init_budget {
            let mut remaining = budget.lock().unwrap();
            if *remaining <= 0 {
                return Err(ServiceError::Initialize {
                    name: self.name.clone(),
                    reason: "budget exhausted".into(),
                });
            }
            *remaining -= 1;
            return Ok(());
        }
        if self.fail_init {
            Err(ServiceError::Initialize {
                name: self.name.clone(),
                reason: "scripted failure".into(),
            })
        } else {
            Ok(())
        }
    }

    async fn start(&self, _ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.log.record(format!("start:{}", self.name));
        if self.fail_start {
            Err(ServiceError::Start {
                name: self.name.clone(),
                reason: "scripted failure".into(),
            })
        } else {
            Ok(())
        }
    }

    async fn stop(&self, _ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.log.record(format!("stop:{}", self.name));
        Ok(())
    }
}

/// Factory producing [`StubService`] handles according to a script.
pub struct StubFactory {
    log: Arc<CallLog>,
    fail_init: HashSet<String>,
    fail_start: HashSet<String>,
    init_budgets: HashMap<String, Arc<Mutex<i64>>>,
}

impl StubFactory {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            fail_init: HashSet::new(),
            fail_start: HashSet::new(),
            init_budgets: HashMap::new(),
        }
    }

    pub fn log_handle(&self) -> Arc<CallLog> {
        Arc::clone(&self.log)
    }

    /// `initialize` always fails for this service.
    pub fn failing_init(mut self, name: &str) -> Self {
        self.fail_init.insert(name.to_string());
        self
    }

    /// `start` always fails for this service.
    pub fn failing_start(mut self, name: &str) -> Self {
        self.fail_start.insert(name.to_string());
        self
    }

    /// `initialize` succeeds `successes` times, then fails forever.
    ///
    /// The budget is shared across handles, so a re-registered service
    /// stays broken.
    pub fn init_budget(mut self, name: &str, successes: i64) -> Self {
        self.init_budgets
            .insert(name.to_string(), Arc::new(Mutex::new(successes)));
        self
    }
}

impl ServiceFactory for StubFactory {
    fn create(&self, endpoint: &ServiceEndpoint) -> Result<ServiceRef, ServiceError> {
        Ok(Arc::new(StubService {
            name: endpoint.name.clone(),
            address: endpoint.address.clone(),
            log: Arc::clone(&self.log),
            fail_init: self.fail_init.contains(&endpoint.name),
            fail_start: self.fail_start.contains(&endpoint.name),
            init_budget: self.init_budgets.get(&endpoint.name).cloned(),
        }))
    }
}

/// [`Services`] wrapper recording boundary calls before delegating to the
/// in-memory backend.
pub struct Recorder {
    log: Arc<CallLog>,
    pub inner: Arc<MemoryServices>,
}

impl Recorder {
    pub fn new(log: Arc<CallLog>, inner: Arc<MemoryServices>) -> Arc<Self> {
        Arc::new(Self { log, inner })
    }
}

#[async_trait]
impl Services for Recorder {
    async fn discover(
        &self,
        ctx: &CancellationToken,
        filter: &Filter,
    ) -> Result<Vec<ServiceEndpoint>, ServiceError> {
        self.log.record("discover");
        self.inner.discover(ctx, filter).await
    }

    async fn watch(
        &self,
        ctx: &CancellationToken,
        filter: &Filter,
    ) -> Result<mpsc::Receiver<ServiceEvent>, ServiceError> {
        self.log.record("watch");
        self.inner.watch(ctx, filter).await
    }

    async fn create_service(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<ServiceRef, ServiceError> {
        self.inner.create_service(endpoint).await
    }

    async fn register(&self, endpoint: &ServiceEndpoint) -> Result<ServiceRef, ServiceError> {
        self.log.record(format!("register:{}", endpoint.name));
        self.inner.register(endpoint).await
    }

    async fn unregister(&self, name: &str) -> Result<(), ServiceError> {
        self.log.record(format!("unregister:{name}"));
        self.inner.unregister(name).await
    }

    async fn list(&self) -> Vec<ServiceRef> {
        self.inner.list().await
    }

    async fn stop_all(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.inner.stop_all(ctx).await
    }
}

/// Builds bare endpoints with distinct addresses.
pub fn endpoints(names: &[&str]) -> Vec<ServiceEndpoint> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| ServiceEndpoint::bare(*name, format!("10.0.0.{}:80", i + 1)))
        .collect()
}

/// Polls `cond` until it holds or `timeout` elapses (panics on timeout).
///
/// Under a paused tokio clock the sleeps auto-advance, so waits are cheap.
pub async fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
