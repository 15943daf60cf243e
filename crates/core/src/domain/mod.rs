// Domain Layer - Queue, message and work unit types

pub mod error;
pub mod message;
pub mod queue;

// Re-exports
pub use error::DomainError;
pub use message::{Identified, Message, MessageBatch, MessageId, WorkUnit};
pub use queue::{QueueDescriptor, QueueName};
