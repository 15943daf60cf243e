// Worker Registry Port

/// Declares how each queue is consumed
pub trait WorkerRegistry: Send + Sync {
    /// True if messages from `queue` are fetched and processed as one batch
    fn is_batch_queue(&self, queue: &str) -> bool;
}

pub mod mocks {
    use super::*;
    use std::collections::HashSet;

    /// Mock registry with a fixed set of batch-mode queues
    #[derive(Default)]
    pub struct MockWorkerRegistry {
        batch_queues: HashSet<String>,
    }

    impl MockWorkerRegistry {
        pub fn new(batch_queues: &[&str]) -> Self {
            Self {
                batch_queues: batch_queues.iter().map(|q| q.to_string()).collect(),
            }
        }
    }

    impl WorkerRegistry for MockWorkerRegistry {
        fn is_batch_queue(&self, queue: &str) -> bool {
            self.batch_queues.contains(queue)
        }
    }
}
