// Graceful shutdown helpers

use shoal_core::application::Manager;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until every admitted unit has released its slot, or `timeout` passes
///
/// Returns true when nothing is left in flight.
pub async fn drain_in_flight(manager: &Manager, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    if manager.busy() > 0 {
        info!(busy = manager.busy(), "Waiting for in-flight units");
    }

    while manager.busy() > 0 && Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }

    let busy = manager.busy();
    if busy > 0 {
        warn!(busy = busy, "Shutting down with units still in flight");
    }
    busy == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoal_core::application::{FetchErrorPolicy, ManagerConfig};
    use shoal_core::domain::{Message, WorkUnit};
    use shoal_core::port::event_hook::mocks::MockEventHook;
    use shoal_core::port::execution_pool::mocks::MockExecutionPool;
    use shoal_core::port::fetcher::mocks::MockFetcher;
    use shoal_core::port::polling_strategy::mocks::MockPollingStrategy;
    use shoal_core::port::processor::mocks::MockProcessor;
    use shoal_core::port::worker_registry::mocks::MockWorkerRegistry;
    use std::sync::Arc;

    fn manager(
        fetcher: MockFetcher,
        processor: Arc<MockProcessor>,
        policy: FetchErrorPolicy,
    ) -> Manager {
        Manager::new(
            ManagerConfig::new(2)
                .with_min_dispatch_interval(Duration::from_millis(10))
                .with_fetch_error_policy(policy),
            Arc::new(fetcher),
            Arc::new(MockPollingStrategy::new(&["default"])),
            Arc::new(MockWorkerRegistry::default()),
            processor,
            Arc::new(MockExecutionPool::new()),
            Arc::new(MockEventHook::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_halted_manager_drains_admitted_units() {
        let fetcher = MockFetcher::new();
        fetcher.push_failure("default", "queue deleted");
        let processor = Arc::new(MockProcessor::new_sleeping(Duration::from_millis(150)));
        let manager = manager(fetcher, processor.clone(), FetchErrorPolicy::Halt);

        let completion = manager
            .assign("default", WorkUnit::Single(Message::new("m-1", "{}")))
            .unwrap();

        // The loop halts on the first fetch while m-1 is still running
        assert!(manager.start().await.is_err());
        assert_eq!(manager.busy(), 1);

        assert!(drain_in_flight(&manager, Duration::from_secs(2)).await);
        assert_eq!(manager.busy(), 0);
        completion.await.unwrap();
        assert_eq!(processor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_timeout() {
        let processor = Arc::new(MockProcessor::new_sleeping(Duration::from_secs(2)));
        let manager = manager(MockFetcher::new(), processor, FetchErrorPolicy::Skip);

        manager
            .assign("default", WorkUnit::Single(Message::new("m-1", "{}")))
            .unwrap();

        assert!(!drain_in_flight(&manager, Duration::from_millis(60)).await);
        assert_eq!(manager.busy(), 1);
    }

    #[tokio::test]
    async fn test_drain_with_nothing_in_flight_returns_immediately() {
        let processor = Arc::new(MockProcessor::new_success());
        let manager = manager(MockFetcher::new(), processor, FetchErrorPolicy::Skip);

        assert!(drain_in_flight(&manager, Duration::ZERO).await);
    }
}
