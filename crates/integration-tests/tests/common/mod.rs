//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use shoal_core::application::{Manager, ManagerConfig};
use shoal_core::domain::{Identified, WorkUnit};
use shoal_core::port::id_provider::mocks::SequentialIdProvider;
use shoal_core::port::time_provider::SystemTimeProvider;
use shoal_core::port::{ProcessError, Processor};
use shoal_infra_memory::{
    InMemoryQueueStore, StaticWorkerRegistry, TokioExecutionPool, TracingEventHook,
    WeightedRoundRobin,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const TEST_INTERVAL: Duration = Duration::from_millis(10);

/// Unit observed by the recording processor
#[derive(Debug, Clone)]
pub struct Seen {
    pub queue: String,
    pub unit_id: String,
    pub message_ids: Vec<String>,
}

/// Processor recording every unit, with configurable latency and failures
///
/// Messages whose body is `fail` return an error; `panic` panics.
pub struct RecordingProcessor {
    delay: Duration,
    seen: Mutex<Vec<Seen>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    finished: AtomicUsize,
}

impl RecordingProcessor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            seen: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn started(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn message_count(&self) -> usize {
        self.seen().iter().map(|s| s.message_ids.len()).sum()
    }
}

/// Decrements the in-flight gauge even when the handler panics
struct InFlight<'a>(&'a RecordingProcessor);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.0.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Processor for RecordingProcessor {
    async fn process(&self, queue: &str, unit: &WorkUnit) -> Result<(), ProcessError> {
        self.seen.lock().unwrap().push(Seen {
            queue: queue.to_string(),
            unit_id: unit.message_id().to_string(),
            message_ids: unit.messages().iter().map(|m| m.id.clone()).collect(),
        });

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        let _guard = InFlight(self);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        for message in unit.messages() {
            match message.body.as_str() {
                "fail" => return Err(ProcessError::Failed(format!("{} rejected", message.id))),
                "panic" => panic!("{} blew up", message.id),
                _ => {}
            }
        }
        Ok(())
    }
}

pub struct Fixture {
    pub manager: Arc<Manager>,
    pub store: Arc<InMemoryQueueStore>,
    pub polling: Arc<WeightedRoundRobin>,
    pub processor: Arc<RecordingProcessor>,
    pub pool: Arc<TokioExecutionPool>,
}

impl Fixture {
    /// Build a manager over in-memory adapters
    pub fn new(
        config: ManagerConfig,
        queues: &[(&str, usize)],
        batch_queues: &[&str],
        processor_delay: Duration,
        pause_delay: Duration,
    ) -> Self {
        let store = Arc::new(InMemoryQueueStore::new(Arc::new(
            SequentialIdProvider::default(),
        )));
        let polling = Arc::new(WeightedRoundRobin::new(
            queues.iter().map(|(q, w)| (q.to_string(), *w)).collect(),
            pause_delay,
            Arc::new(SystemTimeProvider),
        ));
        let processor = Arc::new(RecordingProcessor::new(processor_delay));
        let pool = Arc::new(TokioExecutionPool::current().unwrap());

        let manager = Manager::new(
            config,
            store.clone(),
            polling.clone(),
            Arc::new(StaticWorkerRegistry::new(batch_queues.iter().copied())),
            processor.clone(),
            pool.clone(),
            Arc::new(TracingEventHook),
        )
        .unwrap();

        Self {
            manager: Arc::new(manager),
            store,
            polling,
            processor,
            pool,
        }
    }

    pub fn push(&self, queue: &str, count: usize) {
        for i in 0..count {
            self.store.push_body(queue, format!("payload {}", i));
        }
    }

    pub fn spawn(&self) -> tokio::task::JoinHandle<shoal_core::Result<()>> {
        let manager = Arc::clone(&self.manager);
        tokio::spawn(async move { manager.start().await })
    }

    pub async fn stop(&self, handle: tokio::task::JoinHandle<shoal_core::Result<()>>) {
        self.manager.stop();
        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("dispatch loop should exit after stop")
            .unwrap();
        assert!(result.is_ok());
    }
}

pub fn config(concurrency: usize) -> ManagerConfig {
    ManagerConfig::new(concurrency).with_min_dispatch_interval(TEST_INTERVAL)
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
