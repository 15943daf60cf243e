// Shoal Infrastructure - In-memory Adapters
// Implements: Fetcher, PollingStrategy, WorkerRegistry, ExecutionPool, EventHook, Processor

pub mod logging_processor;
pub mod queue_store;
pub mod tokio_pool;
pub mod tracing_hook;
pub mod weighted_round_robin;
pub mod worker_registry_impl;

pub use logging_processor::LoggingProcessor;
pub use queue_store::InMemoryQueueStore;
pub use tokio_pool::TokioExecutionPool;
pub use tracing_hook::TracingEventHook;
pub use weighted_round_robin::WeightedRoundRobin;
pub use worker_registry_impl::StaticWorkerRegistry;
