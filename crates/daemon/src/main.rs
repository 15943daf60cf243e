//! Shoal - Main Entry Point
//! Queue consumer daemon: in-memory queues + weighted round-robin polling

mod config;
mod shutdown;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{DaemonConfig, LogFormat};
use shoal_core::application::Manager;
use shoal_core::port::id_provider::UuidProvider;
use shoal_core::port::time_provider::SystemTimeProvider;
use shoal_infra_memory::{
    InMemoryQueueStore, LoggingProcessor, StaticWorkerRegistry, TokioExecutionPool,
    TracingEventHook, WeightedRoundRobin,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long shutdown waits for the dispatch loop to exit
const LOOP_EXIT_TIMEOUT: Duration = Duration::from_secs(2);
/// How long shutdown waits for in-flight units to drain
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("shoal=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration and initialize logging
    let config = DaemonConfig::from_env()?;
    init_logging(config.log_format)?;

    info!("Shoal v{} starting...", VERSION);
    info!(
        concurrency = config.concurrency,
        queues = ?config.queues,
        batch_queues = ?config.batch_queues,
        fetch_error_policy = %config.fetch_error_policy,
        "Configuration loaded"
    );

    // 2. Queue store (optionally seeded)
    let store = Arc::new(InMemoryQueueStore::new(Arc::new(UuidProvider)));
    if let Some(path) = &config.seed_file {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        store.seed_from_json(&json)?;
    }

    // 3. Setup dependencies (DI wiring)
    let polling_strategy = Arc::new(WeightedRoundRobin::new(
        config.queues.clone(),
        config.delay,
        Arc::new(SystemTimeProvider),
    ));
    let registry = Arc::new(StaticWorkerRegistry::new(config.batch_queues.clone()));
    let execution_pool = Arc::new(TokioExecutionPool::current()?);

    let manager = Arc::new(Manager::new(
        config.manager_config(),
        store.clone(),
        polling_strategy,
        registry,
        Arc::new(LoggingProcessor),
        execution_pool.clone(),
        Arc::new(TracingEventHook),
    )?);

    // 4. Start the dispatch loop
    info!("Starting manager...");
    let loop_manager = Arc::clone(&manager);
    let mut manager_handle = tokio::spawn(async move { loop_manager.start().await });

    info!("System ready. Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal (or the loop halting on its own)
    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received. Exiting gracefully...");
            None
        }
        finished = &mut manager_handle => Some(finished),
    };

    let outcome: Result<()> = match finished {
        None => {
            manager.stop();
            match tokio::time::timeout(LOOP_EXIT_TIMEOUT, manager_handle).await {
                Ok(Ok(Err(e))) => warn!(error = %e, "Manager exited with error"),
                Ok(Err(join_err)) => warn!(error = %join_err, "Manager task failed"),
                Err(_) => warn!("Manager loop did not exit in time"),
                Ok(Ok(Ok(()))) => {}
            }
            Ok(())
        }
        Some(Ok(Ok(()))) => {
            info!("Manager stopped");
            Ok(())
        }
        Some(Ok(Err(e))) => {
            error!(error = %e, "Manager halted");
            Err(e.into())
        }
        Some(Err(join_err)) => Err(anyhow::anyhow!("Manager task failed: {}", join_err)),
    };

    // 6. Graceful shutdown: admitted units finish before the runtime is dropped
    shutdown::drain_in_flight(&manager, DRAIN_TIMEOUT).await;
    execution_pool.shutdown();
    info!(
        unprocessed = store.total_len(),
        submitted = execution_pool.submitted(),
        "Shutdown complete."
    );

    outcome
}
