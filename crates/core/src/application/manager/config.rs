// Manager configuration

use super::constants::{BATCH_LIMIT, MIN_DISPATCH_INTERVAL};
use crate::error::{AppError, Result};
use std::str::FromStr;
use std::time::Duration;

/// What the dispatch loop does when the fetcher returns an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchErrorPolicy {
    /// Log, back off for one dispatch interval and keep polling
    #[default]
    Skip,
    /// Stop the manager and return the error from `start`
    Halt,
}

impl FromStr for FetchErrorPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(FetchErrorPolicy::Skip),
            "halt" => Ok(FetchErrorPolicy::Halt),
            other => Err(AppError::Config(format!(
                "Unknown fetch error policy '{}' (expected 'skip' or 'halt')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FetchErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchErrorPolicy::Skip => write!(f, "skip"),
            FetchErrorPolicy::Halt => write!(f, "halt"),
        }
    }
}

/// Manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Maximum number of units admitted at once
    pub concurrency: usize,

    /// Messages requested per batch-mode poll
    pub batch_limit: usize,

    /// Backoff when no slot is free or no queue is eligible
    pub min_dispatch_interval: Duration,

    pub fetch_error_policy: FetchErrorPolicy,
}

impl ManagerConfig {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            batch_limit: BATCH_LIMIT,
            min_dispatch_interval: MIN_DISPATCH_INTERVAL,
            fetch_error_policy: FetchErrorPolicy::default(),
        }
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    pub fn with_min_dispatch_interval(mut self, interval: Duration) -> Self {
        self.min_dispatch_interval = interval;
        self
    }

    pub fn with_fetch_error_policy(mut self, policy: FetchErrorPolicy) -> Self {
        self.fetch_error_policy = policy;
        self
    }

    /// Reject configurations the dispatch loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(AppError::Config(
                "concurrency must be a positive integer".to_string(),
            ));
        }
        if self.batch_limit == 0 {
            return Err(AppError::Config(
                "batch_limit must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::new(25);
        assert_eq!(config.batch_limit, 10);
        assert_eq!(config.min_dispatch_interval, Duration::from_millis(100));
        assert_eq!(config.fetch_error_policy, FetchErrorPolicy::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = ManagerConfig::new(0).validate().unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_zero_batch_limit_rejected() {
        let err = ManagerConfig::new(1)
            .with_batch_limit(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("batch_limit"));
    }

    #[test]
    fn test_parse_fetch_error_policy() {
        assert_eq!("skip".parse::<FetchErrorPolicy>().unwrap(), FetchErrorPolicy::Skip);
        assert_eq!(" HALT ".parse::<FetchErrorPolicy>().unwrap(), FetchErrorPolicy::Halt);
        assert!("retry".parse::<FetchErrorPolicy>().is_err());
    }
}
