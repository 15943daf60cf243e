// Manager constants (no magic values)
use std::time::Duration;

/// Maximum number of messages fetched for one batch-mode poll (10)
pub const BATCH_LIMIT: usize = 10;

/// Backoff when no slot is free or no queue is eligible (100ms)
pub const MIN_DISPATCH_INTERVAL: Duration = Duration::from_millis(100);
