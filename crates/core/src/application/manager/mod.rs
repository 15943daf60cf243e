// Manager - Concurrency-bounded dispatch loop

mod capacity;
pub mod config;
pub mod constants;
mod panic_guard;

pub use capacity::{CapacityGate, SlotGuard};
pub use config::{FetchErrorPolicy, ManagerConfig};
pub use panic_guard::{execute_guarded_async, PanicGuardResult};

use crate::domain::{Identified, MessageBatch, QueueDescriptor, WorkUnit};
use crate::error::Result;
use crate::port::{
    Completion, EventHook, ExecutionPool, Fetcher, PollingStrategy, Processor, WorkerRegistry,
    DISPATCH_EVENT,
};
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of one dispatch iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    /// A queue was polled; loop again immediately
    Polled,
    /// No free slot or no eligible queue; back off
    Idle,
}

/// Manager pulls work from queues and admits it to the execution pool,
/// never holding more than `concurrency` units at once.
///
/// Batch-mode queues are fetched `batch_limit` messages at a time and the
/// whole batch occupies a single slot. Other queues are fetched up to the
/// remaining capacity, one slot per message.
pub struct Manager {
    config: ManagerConfig,
    gate: Arc<CapacityGate>,
    fetcher: Arc<dyn Fetcher>,
    polling_strategy: Arc<dyn PollingStrategy>,
    registry: Arc<dyn WorkerRegistry>,
    processor: Arc<dyn Processor>,
    execution_pool: Arc<dyn ExecutionPool>,
    event_hook: Arc<dyn EventHook>,
}

impl Manager {
    /// Create a manager with all collaborators injected
    ///
    /// # Errors
    /// - AppError::Config if `config` fails validation
    pub fn new(
        config: ManagerConfig,
        fetcher: Arc<dyn Fetcher>,
        polling_strategy: Arc<dyn PollingStrategy>,
        registry: Arc<dyn WorkerRegistry>,
        processor: Arc<dyn Processor>,
        execution_pool: Arc<dyn ExecutionPool>,
        event_hook: Arc<dyn EventHook>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: Arc::new(CapacityGate::new(config.concurrency)),
            config,
            fetcher,
            polling_strategy,
            registry,
            processor,
            execution_pool,
            event_hook,
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Occupied slots
    pub fn busy(&self) -> usize {
        self.gate.busy()
    }

    /// Free slots
    pub fn ready(&self) -> usize {
        self.gate.ready()
    }

    /// True after `stop` or once the execution pool stopped accepting work
    pub fn is_stopped(&self) -> bool {
        self.gate.is_stopped() || !self.execution_pool.is_running()
    }

    /// Request a graceful stop and return immediately.
    ///
    /// No unit is admitted afterwards; admitted units run to completion.
    pub fn stop(&self) {
        if self.gate.try_stop() {
            info!(busy = self.gate.busy(), "Manager stop requested");
        }
    }

    /// Run the dispatch loop until stopped
    ///
    /// # Errors
    /// - AppError::Fetch when the fetcher fails under `FetchErrorPolicy::Halt`
    pub async fn start(&self) -> Result<()> {
        info!(
            concurrency = self.config.concurrency,
            batch_limit = self.config.batch_limit,
            fetch_error_policy = %self.config.fetch_error_policy,
            "Manager started"
        );

        loop {
            if self.is_stopped() {
                break;
            }

            match self.dispatch().await {
                // Fetchers that never suspend would otherwise starve the runtime
                Ok(Dispatch::Polled) => tokio::task::yield_now().await,
                Ok(Dispatch::Idle) => self.gate.pause(self.config.min_dispatch_interval).await,
                Err(e) => match self.config.fetch_error_policy {
                    FetchErrorPolicy::Skip => {
                        warn!(error = %e, "Dispatch failed, skipping this poll");
                        self.gate.pause(self.config.min_dispatch_interval).await;
                    }
                    FetchErrorPolicy::Halt => {
                        error!(error = %e, "Dispatch failed, halting manager");
                        self.gate.try_stop();
                        return Err(e);
                    }
                },
            }
        }

        info!(busy = self.gate.busy(), "Manager stopped");
        Ok(())
    }

    /// Admit one unit and hand it to the execution pool.
    ///
    /// Returns the unit's completion handle, or `None` if the manager is
    /// stopped or every slot is taken. The slot is released exactly once when
    /// the unit finishes, whether the processor succeeds, fails or panics.
    pub fn assign(&self, queue: &str, unit: WorkUnit) -> Option<Completion> {
        if self.is_stopped() {
            return None;
        }

        debug!(queue = %queue, message_id = %unit.message_id(), "Assigning");

        let Some(slot) = self.gate.try_admit() else {
            warn!(
                queue = %queue,
                message_id = %unit.message_id(),
                "No free slot, unit not admitted"
            );
            return None;
        };

        let processor = Arc::clone(&self.processor);
        let queue = queue.to_string();

        let task = async move {
            let _slot = slot;

            match execute_guarded_async(processor.process(&queue, &unit)).await {
                PanicGuardResult::Success(Ok(())) => {
                    debug!(queue = %queue, message_id = %unit.message_id(), "Processed");
                }
                PanicGuardResult::Success(Err(e)) => {
                    error!(
                        queue = %queue,
                        message_id = %unit.message_id(),
                        error = %e,
                        "Processing failed"
                    );
                }
                PanicGuardResult::Panicked(panic_msg) => {
                    error!(
                        queue = %queue,
                        message_id = %unit.message_id(),
                        panic_msg = %panic_msg,
                        "Processor panicked"
                    );
                }
            }
        }
        .boxed();

        Some(self.execution_pool.submit(task))
    }

    async fn dispatch(&self) -> Result<Dispatch> {
        let ready = self.gate.ready();
        if ready == 0 {
            return Ok(Dispatch::Idle);
        }

        let Some(queue) = self.polling_strategy.next_queue() else {
            return Ok(Dispatch::Idle);
        };

        self.event_hook.fire_event(DISPATCH_EVENT);

        debug!(
            ready = ready,
            busy = self.gate.busy(),
            active_queues = self.polling_strategy.active_queue_count(),
            queue = %queue,
            "Dispatching"
        );

        if self.registry.is_batch_queue(&queue.name) {
            self.dispatch_batch(&queue).await?;
        } else {
            self.dispatch_single_messages(&queue, ready).await?;
        }

        Ok(Dispatch::Polled)
    }

    async fn dispatch_batch(&self, queue: &QueueDescriptor) -> Result<()> {
        let messages = self.fetcher.fetch(queue, self.config.batch_limit).await?;
        if messages.is_empty() {
            return Ok(());
        }

        self.polling_strategy
            .messages_found(&queue.name, messages.len());

        let batch = MessageBatch::new(messages)?;
        let count = batch.len();
        if self.assign(&queue.name, WorkUnit::Batch(batch)).is_none() {
            warn!(queue = %queue, dropped = count, "Fetched batch not admitted");
        }
        Ok(())
    }

    async fn dispatch_single_messages(&self, queue: &QueueDescriptor, ready: usize) -> Result<()> {
        let messages = self.fetcher.fetch(queue, ready).await?;

        self.polling_strategy
            .messages_found(&queue.name, messages.len());

        let mut dropped = 0;
        for message in messages {
            if self.assign(&queue.name, WorkUnit::Single(message)).is_none() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(queue = %queue, dropped = dropped, "Fetched messages not admitted");
        }
        Ok(())
    }
}
