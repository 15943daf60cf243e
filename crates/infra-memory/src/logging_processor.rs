// Logging processor: default business logic for the daemon
use async_trait::async_trait;
use tracing::info;

use shoal_core::domain::{Identified, WorkUnit};
use shoal_core::port::{ProcessError, Processor};

/// Logs every message of a unit and accepts it
///
/// Units carrying a blank message body are rejected with
/// `ProcessError::InvalidBody`.
pub struct LoggingProcessor;

#[async_trait]
impl Processor for LoggingProcessor {
    async fn process(&self, queue: &str, unit: &WorkUnit) -> Result<(), ProcessError> {
        for message in unit.messages() {
            if message.body.trim().is_empty() {
                return Err(ProcessError::InvalidBody(format!(
                    "message {} has an empty body",
                    message.id
                )));
            }

            info!(
                queue = %queue,
                unit_id = %unit.message_id(),
                message_id = %message.id,
                body_len = message.body.len(),
                "Processing message"
            );
        }
        Ok(())
    }
}
