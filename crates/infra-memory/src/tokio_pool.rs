// Tokio execution pool implementation
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::runtime::Handle;
use tracing::info;

use shoal_core::error::{AppError, Result};
use shoal_core::port::{Completion, ExecutionPool};

/// Runs admitted units as tasks on a tokio runtime
///
/// The pool does not bound concurrency itself; the manager's capacity gate
/// does.
pub struct TokioExecutionPool {
    handle: Handle,
    running: AtomicBool,
    submitted: AtomicU64,
}

impl TokioExecutionPool {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            running: AtomicBool::new(true),
            submitted: AtomicU64::new(0),
        }
    }

    /// Pool bound to the runtime the caller is running on
    ///
    /// # Errors
    /// - AppError::Internal when called outside a tokio runtime
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| AppError::Internal(format!("No tokio runtime: {}", e)))?;
        Ok(Self::new(handle))
    }

    /// Stop accepting work; a manager using this pool exits its loop
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!(
                submitted = self.submitted.load(Ordering::SeqCst),
                "Execution pool shut down"
            );
        }
    }

    /// Total units submitted so far
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }
}

impl ExecutionPool for TokioExecutionPool {
    fn submit(&self, task: BoxFuture<'static, ()>) -> Completion {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.handle.spawn(task)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
