// In-memory queue store implementation
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, trace};

use shoal_core::domain::{Message, MessageId, QueueDescriptor, QueueName};
use shoal_core::error::{AppError, Result};
use shoal_core::port::id_provider::UuidProvider;
use shoal_core::port::{Fetcher, IdProvider};

/// Named FIFO queues held in process memory
///
/// Fetching removes messages; there is no visibility timeout or redelivery.
pub struct InMemoryQueueStore {
    queues: Mutex<HashMap<QueueName, VecDeque<Message>>>,
    id_provider: Arc<dyn IdProvider>,
}

impl InMemoryQueueStore {
    /// Create an empty store
    ///
    /// # Arguments
    /// * `id_provider` - Generates ids for messages pushed by body only
    pub fn new(id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            id_provider,
        }
    }

    fn queues(&self) -> MutexGuard<'_, HashMap<QueueName, VecDeque<Message>>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message to `queue`, creating the queue if needed
    pub fn push(&self, queue: &str, message: Message) {
        self.queues()
            .entry(queue.to_string())
            .or_default()
            .push_back(message);
    }

    /// Append a message with a generated id and return that id
    pub fn push_body(&self, queue: &str, body: impl Into<String>) -> MessageId {
        let id = self.id_provider.generate_id();
        self.push(queue, Message::new(id.clone(), body));
        id
    }

    /// Number of messages waiting in `queue`
    pub fn len(&self, queue: &str) -> usize {
        self.queues().get(queue).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, queue: &str) -> bool {
        self.len(queue) == 0
    }

    /// Number of messages waiting across all queues
    pub fn total_len(&self) -> usize {
        self.queues().values().map(VecDeque::len).sum()
    }

    /// Load messages from a JSON object mapping queue names to arrays of bodies
    ///
    /// String elements are used as-is; any other JSON value is stored as its
    /// serialized text.
    ///
    /// # Example
    /// ```text
    /// { "default": ["hello", {"kind": "ping"}], "reports": ["r1", "r2"] }
    /// ```
    ///
    /// # Returns
    /// Number of messages loaded
    pub fn seed_from_json(&self, json: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value.as_object().ok_or_else(|| {
            AppError::Config("Seed file must be a JSON object of queue -> messages".to_string())
        })?;

        let mut loaded = 0;
        for (queue, bodies) in object {
            let bodies = bodies.as_array().ok_or_else(|| {
                AppError::Config(format!("Seed entry for queue '{}' must be an array", queue))
            })?;

            for body in bodies {
                let body = match body {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                self.push_body(queue, body);
                loaded += 1;
            }
        }

        info!(messages = loaded, queues = object.len(), "Seeded in-memory queues");
        Ok(loaded)
    }
}

impl Default for InMemoryQueueStore {
    fn default() -> Self {
        Self::new(Arc::new(UuidProvider))
    }
}

#[async_trait]
impl Fetcher for InMemoryQueueStore {
    async fn fetch(&self, queue: &QueueDescriptor, limit: usize) -> Result<Vec<Message>> {
        let mut queues = self.queues();
        let Some(pending) = queues.get_mut(queue.name()) else {
            trace!(queue = %queue, "Fetch from unknown queue");
            return Ok(Vec::new());
        };

        let take = limit.min(pending.len());
        let messages: Vec<Message> = pending.drain(..take).collect();

        debug!(
            queue = %queue,
            limit = limit,
            fetched = messages.len(),
            remaining = pending.len(),
            "Fetched messages"
        );
        Ok(messages)
    }
}
