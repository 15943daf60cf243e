// Message and WorkUnit Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Message identifier (assigned by the queue source)
pub type MessageId = String;

/// Anything handed to a processor carries an identifier
pub trait Identified {
    fn message_id(&self) -> &str;
}

/// A single message pulled from a queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub body: String,
}

impl Message {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }
}

impl Identified for Message {
    fn message_id(&self) -> &str {
        &self.id
    }
}

/// Messages fetched together from a batch-mode queue.
///
/// The batch is admitted as one unit and identified as
/// `batch-with-N-messages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBatch {
    id: MessageId,
    messages: Vec<Message>,
}

impl MessageBatch {
    /// Wrap fetched messages; a batch is never empty
    pub fn new(messages: Vec<Message>) -> Result<Self> {
        if messages.is_empty() {
            return Err(DomainError::EmptyBatch);
        }
        Ok(Self {
            id: format!("batch-with-{}-messages", messages.len()),
            messages,
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Identified for MessageBatch {
    fn message_id(&self) -> &str {
        &self.id
    }
}

/// Unit of admitted work: occupies exactly one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    Single(Message),
    Batch(MessageBatch),
}

impl WorkUnit {
    /// Number of messages carried by this unit
    pub fn len(&self) -> usize {
        match self {
            WorkUnit::Single(_) => 1,
            WorkUnit::Batch(batch) => batch.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, WorkUnit::Batch(_))
    }

    /// All messages of the unit, in fetch order
    pub fn messages(&self) -> &[Message] {
        match self {
            WorkUnit::Single(message) => std::slice::from_ref(message),
            WorkUnit::Batch(batch) => batch.messages(),
        }
    }
}

impl Identified for WorkUnit {
    fn message_id(&self) -> &str {
        match self {
            WorkUnit::Single(message) => message.message_id(),
            WorkUnit::Batch(batch) => batch.message_id(),
        }
    }
}

impl From<Message> for WorkUnit {
    fn from(message: Message) -> Self {
        WorkUnit::Single(message)
    }
}

impl From<MessageBatch> for WorkUnit {
    fn from(batch: MessageBatch) -> Self {
        WorkUnit::Batch(batch)
    }
}
