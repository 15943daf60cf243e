// Static worker registry implementation
use std::collections::HashSet;

use shoal_core::domain::QueueName;
use shoal_core::port::WorkerRegistry;

/// Registry with a fixed set of batch-mode queues; every other queue is
/// consumed one message at a time
#[derive(Debug, Default, Clone)]
pub struct StaticWorkerRegistry {
    batch_queues: HashSet<QueueName>,
}

impl StaticWorkerRegistry {
    pub fn new<I, S>(batch_queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            batch_queues: batch_queues.into_iter().map(Into::into).collect(),
        }
    }
}

impl WorkerRegistry for StaticWorkerRegistry {
    fn is_batch_queue(&self, queue: &str) -> bool {
        self.batch_queues.contains(queue)
    }
}
