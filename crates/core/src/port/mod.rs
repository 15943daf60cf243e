// Port Layer - Interfaces for external collaborators

pub mod event_hook;
pub mod execution_pool;
pub mod fetcher;
pub mod id_provider; // For deterministic testing
pub mod polling_strategy;
pub mod processor;
pub mod time_provider;
pub mod worker_registry;

// Re-exports
pub use event_hook::{EventHook, DISPATCH_EVENT};
pub use execution_pool::{Completion, ExecutionPool};
pub use fetcher::Fetcher;
pub use id_provider::IdProvider;
pub use polling_strategy::PollingStrategy;
pub use processor::{ProcessError, Processor};
pub use time_provider::TimeProvider;
pub use worker_registry::WorkerRegistry;
