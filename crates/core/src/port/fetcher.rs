// Fetcher Port
// Abstraction over the queue transport: "fetch up to N messages from queue Q"

use crate::domain::{Message, QueueDescriptor};
use crate::error::Result;
use async_trait::async_trait;

/// Queue fetcher trait
///
/// Implementations:
/// - InMemoryQueueStore: drains an in-process FIFO (shoal-infra-memory)
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch up to `limit` messages from `queue`
    ///
    /// May return fewer messages than requested, including none.
    ///
    /// # Errors
    /// - AppError::Fetch if the transport fails
    async fn fetch(&self, queue: &QueueDescriptor, limit: usize) -> Result<Vec<Message>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted response for one fetch call
    #[derive(Debug, Clone)]
    pub enum FetchResponse {
        Messages(Vec<Message>),
        Fail(String),
    }

    /// Mock Fetcher returning scripted responses per queue
    ///
    /// Once a queue's script is exhausted every further fetch returns nothing.
    /// Scripted message lists are truncated to the requested limit.
    #[derive(Default)]
    pub struct MockFetcher {
        scripts: Mutex<HashMap<String, VecDeque<FetchResponse>>>,
        calls: Mutex<Vec<(String, usize)>>,
        latency: Duration,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delay every fetch by `latency` before its response is taken
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        /// Queue a successful response for `queue`
        pub fn push_messages(&self, queue: &str, messages: Vec<Message>) {
            self.push(queue, FetchResponse::Messages(messages));
        }

        /// Queue `n` generated messages for `queue`
        pub fn push_generated(&self, queue: &str, n: usize) {
            let messages = (0..n)
                .map(|i| Message::new(format!("{}-{}", queue, i), "{}"))
                .collect();
            self.push_messages(queue, messages);
        }

        /// Queue a failing response for `queue`
        pub fn push_failure(&self, queue: &str, message: impl Into<String>) {
            self.push(queue, FetchResponse::Fail(message.into()));
        }

        fn push(&self, queue: &str, response: FetchResponse) {
            self.scripts
                .lock()
                .unwrap()
                .entry(queue.to_string())
                .or_default()
                .push_back(response);
        }

        /// Every (queue, limit) pair passed to `fetch`, in call order
        pub fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, queue: &QueueDescriptor, limit: usize) -> Result<Vec<Message>> {
            self.calls
                .lock()
                .unwrap()
                .push((queue.name.clone(), limit));

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            let next = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(&queue.name)
                .and_then(|script| script.pop_front());

            match next {
                Some(FetchResponse::Messages(mut messages)) => {
                    messages.truncate(limit);
                    Ok(messages)
                }
                Some(FetchResponse::Fail(message)) => Err(AppError::fetch(&queue.name, message)),
                None => Ok(Vec::new()),
            }
        }
    }
}
