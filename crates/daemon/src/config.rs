//! Daemon configuration loaded from environment variables
//!
//! # Environment Variables
//!
//! - `SHOAL_CONCURRENCY`: maximum units admitted at once (default: 25)
//! - `SHOAL_QUEUES`: comma-separated `name[:weight]` list (default: `default`)
//! - `SHOAL_BATCH_QUEUES`: comma-separated queues consumed in batch mode
//! - `SHOAL_DELAY_MS`: pause after an empty poll, per queue (default: 1000)
//! - `SHOAL_FETCH_ERROR_POLICY`: `skip` or `halt` (default: skip)
//! - `SHOAL_SEED_FILE`: JSON file of messages loaded at startup
//! - `SHOAL_LOG_FORMAT`: `pretty` or `json` (default: pretty)

use anyhow::{anyhow, Context, Result};
use shoal_core::application::{FetchErrorPolicy, ManagerConfig};
use shoal_core::domain::QueueDescriptor;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONCURRENCY: usize = 25;
const DEFAULT_QUEUE: &str = "default";
const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub concurrency: usize,
    pub queues: Vec<(String, usize)>,
    pub batch_queues: Vec<String>,
    pub delay: Duration,
    pub fetch_error_policy: FetchErrorPolicy,
    pub seed_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let concurrency = match lookup("SHOAL_CONCURRENCY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid SHOAL_CONCURRENCY: {}", raw))?,
            None => DEFAULT_CONCURRENCY,
        };

        let queues = match lookup("SHOAL_QUEUES") {
            Some(raw) => parse_queues(&raw)?,
            None => vec![(DEFAULT_QUEUE.to_string(), 1)],
        };

        let batch_queues = lookup("SHOAL_BATCH_QUEUES")
            .map(|raw| split_list(&raw).map(str::to_string).collect())
            .unwrap_or_default();

        let delay = match lookup("SHOAL_DELAY_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid SHOAL_DELAY_MS: {}", raw))?,
            ),
            None => DEFAULT_DELAY,
        };

        let fetch_error_policy = match lookup("SHOAL_FETCH_ERROR_POLICY") {
            Some(raw) => raw.parse::<FetchErrorPolicy>()?,
            None => FetchErrorPolicy::default(),
        };

        let log_format = match lookup("SHOAL_LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            concurrency,
            queues,
            batch_queues,
            delay,
            fetch_error_policy,
            seed_file: lookup("SHOAL_SEED_FILE").map(PathBuf::from),
            log_format,
        })
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig::new(self.concurrency).with_fetch_error_policy(self.fetch_error_policy)
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse `name[:weight]` entries
fn parse_queues(raw: &str) -> Result<Vec<(String, usize)>> {
    let queues = split_list(raw)
        .map(|entry| -> Result<(String, usize)> {
            let (name, weight) = match entry.split_once(':') {
                Some((name, weight)) => {
                    let weight = weight
                        .trim()
                        .parse::<usize>()
                        .with_context(|| format!("Invalid weight for queue '{}'", name.trim()))?;
                    (name, weight)
                }
                None => (entry, 1),
            };
            let queue = QueueDescriptor::parse(name.trim())
                .with_context(|| format!("Invalid SHOAL_QUEUES entry '{}'", entry))?;
            Ok((queue.name, weight))
        })
        .collect::<Result<Vec<_>>>()?;

    if queues.is_empty() {
        return Err(anyhow!("SHOAL_QUEUES must name at least one queue"));
    }
    Ok(queues)
}
