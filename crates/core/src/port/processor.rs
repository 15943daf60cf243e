// Processor Port
// Business logic run for one admitted WorkUnit

use crate::domain::WorkUnit;
use async_trait::async_trait;
use thiserror::Error;

/// Processing errors
///
/// Raised by business logic; the manager logs them and releases the slot.
/// Nothing is retried at this layer.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Handler failed: {0}")]
    Failed(String),

    #[error("Invalid message body: {0}")]
    InvalidBody(String),
}

/// Processor trait
///
/// Implementations:
/// - LoggingProcessor: logs each unit (shoal-infra-memory)
#[async_trait]
pub trait Processor: Send + Sync {
    /// Run business logic for `unit`, fetched from `queue`
    ///
    /// # Errors
    /// - ProcessError::Failed if the handler rejects the unit
    async fn process(&self, queue: &str, unit: &WorkUnit) -> Result<(), ProcessError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::Identified;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock processor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Sleep, then succeed
        Sleep(Duration),
    }

    /// Processed unit as seen by the mock
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ProcessedUnit {
        pub queue: String,
        pub message_id: String,
        pub len: usize,
    }

    /// Mock Processor for testing
    pub struct MockProcessor {
        behavior: MockBehavior,
        processed: Arc<Mutex<Vec<ProcessedUnit>>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl MockProcessor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                processed: Arc::new(Mutex::new(Vec::new())),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }
        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }
        pub fn new_sleeping(duration: Duration) -> Self {
            Self::new(MockBehavior::Sleep(duration))
        }
        pub fn call_count(&self) -> usize {
            self.processed.lock().unwrap().len()
        }
        pub fn processed(&self) -> Vec<ProcessedUnit> {
            self.processed.lock().unwrap().clone()
        }
        /// Highest number of units observed running at once
        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Processor for MockProcessor {
        async fn process(&self, queue: &str, unit: &WorkUnit) -> Result<(), ProcessError> {
            self.processed.lock().unwrap().push(ProcessedUnit {
                queue: queue.to_string(),
                message_id: unit.message_id().to_string(),
                len: unit.len(),
            });

            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

            let result = match self.behavior.clone() {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(ProcessError::Failed(msg)),
                MockBehavior::Panic(msg) => {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Sleep(duration) => {
                    tokio::time::sleep(duration).await;
                    Ok(())
                }
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }
}
