// Execution Pool Port
// Shared substrate that runs admitted units; not owned by the manager

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

/// Completion signal for one submitted unit
pub type Completion = JoinHandle<()>;

/// Task submission capability
pub trait ExecutionPool: Send + Sync {
    /// Schedule `task` for execution and return its completion handle
    fn submit(&self, task: BoxFuture<'static, ()>) -> Completion;

    /// False once the pool stopped accepting work; the dispatch loop then exits
    fn is_running(&self) -> bool;
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Pool spawning onto the ambient tokio runtime, with a switchable
    /// running flag
    pub struct MockExecutionPool {
        running: AtomicBool,
        submitted: AtomicUsize,
    }

    impl MockExecutionPool {
        pub fn new() -> Self {
            Self {
                running: AtomicBool::new(true),
                submitted: AtomicUsize::new(0),
            }
        }

        pub fn shutdown(&self) {
            self.running.store(false, Ordering::SeqCst);
        }

        pub fn submitted(&self) -> usize {
            self.submitted.load(Ordering::SeqCst)
        }
    }

    impl Default for MockExecutionPool {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ExecutionPool for MockExecutionPool {
        fn submit(&self, task: BoxFuture<'static, ()>) -> Completion {
            self.submitted.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(task)
        }

        fn is_running(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }
    }
}
