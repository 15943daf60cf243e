// Polling Strategy Port
// Decides which queue the dispatch loop polls next

use crate::domain::QueueDescriptor;

/// Queue-selection policy
///
/// Called only from the dispatch loop task, but implementations must still be
/// `Send + Sync` since the manager is shared behind an `Arc`.
pub trait PollingStrategy: Send + Sync {
    /// Next queue to poll, or `None` when nothing is eligible right now
    fn next_queue(&self) -> Option<QueueDescriptor>;

    /// Report how many messages the most recent poll of `queue` returned
    fn messages_found(&self, queue: &str, count: usize);

    /// Number of queues currently in rotation (diagnostics only)
    fn active_queue_count(&self) -> usize;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock strategy cycling through a fixed list of queues
    ///
    /// An empty list makes `next_queue` always return `None`.
    pub struct MockPollingStrategy {
        queues: Vec<String>,
        cursor: AtomicUsize,
        next_queue_calls: AtomicUsize,
        found: Mutex<Vec<(String, usize)>>,
    }

    impl MockPollingStrategy {
        pub fn new(queues: &[&str]) -> Self {
            Self {
                queues: queues.iter().map(|q| q.to_string()).collect(),
                cursor: AtomicUsize::new(0),
                next_queue_calls: AtomicUsize::new(0),
                found: Mutex::new(Vec::new()),
            }
        }

        pub fn idle() -> Self {
            Self::new(&[])
        }

        pub fn next_queue_calls(&self) -> usize {
            self.next_queue_calls.load(Ordering::SeqCst)
        }

        /// Every (queue, count) reported through `messages_found`
        pub fn found(&self) -> Vec<(String, usize)> {
            self.found.lock().unwrap().clone()
        }
    }

    impl PollingStrategy for MockPollingStrategy {
        fn next_queue(&self) -> Option<QueueDescriptor> {
            self.next_queue_calls.fetch_add(1, Ordering::SeqCst);
            if self.queues.is_empty() {
                return None;
            }
            let index = self.cursor.fetch_add(1, Ordering::SeqCst) % self.queues.len();
            Some(QueueDescriptor::new(self.queues[index].clone()))
        }

        fn messages_found(&self, queue: &str, count: usize) {
            self.found.lock().unwrap().push((queue.to_string(), count));
        }

        fn active_queue_count(&self) -> usize {
            self.queues.len()
        }
    }
}
