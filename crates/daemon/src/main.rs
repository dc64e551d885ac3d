//! Docwatch Job Monitor - Main Entry Point
//!
//! Composition root: wires the HTTP job source into the polling
//! scheduler and drives the lifecycle from process signals (start on
//! launch, stop on SIGINT).

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docwatch_core::application::{PollerConfig, PollingScheduler};
use docwatch_core::domain::ChangeEvent;
use docwatch_core::port::SystemTimeProvider;
use docwatch_infra_http::{HttpJobSource, HttpJobSourceConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("DOCWATCH_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("docwatch=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Docwatch job monitor v{} starting...", VERSION);

    // 2. Load configuration
    let api_url = std::env::var("DOCWATCH_API_URL")
        .context("DOCWATCH_API_URL must point at the corpus job API")?;

    let mut poller_config = PollerConfig::default();
    if let Some(limit) = env_usize("DOCWATCH_ACTIVE_LIMIT") {
        poller_config.active_fetch_limit = limit;
    }
    if let Some(limit) = env_usize("DOCWATCH_COMPLETED_LIMIT") {
        poller_config.completed_fetch_limit = limit;
    }

    // 3. Setup dependencies (DI wiring)
    let source = Arc::new(HttpJobSource::new(HttpJobSourceConfig::new(&api_url)));
    let time_provider = Arc::new(SystemTimeProvider);
    let scheduler = Arc::new(PollingScheduler::new(source, time_provider, poller_config));

    // 4. Drain change events into the log (a UI would subscribe here)
    let mut events = scheduler.subscribe();
    let event_logger = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ChangeEvent::ProgressUpdate { job } => {
                    info!(job_id = %job.id, status = %job.status, progress = job.progress, "Job progress");
                }
                ChangeEvent::JobCompleted { job } => {
                    info!(job_id = %job.id, status = %job.status, "Job finished");
                }
                ChangeEvent::JobCleanup { job_id } => {
                    info!(job_id = %job_id, "Job evicted");
                }
            }
        }
    });

    // 5. Start polling (session login equivalent)
    info!(api_url = %api_url, "Starting job polling");
    scheduler.start();

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutdown signal received, stopping poller...");
    scheduler.stop();
    event_logger.abort();

    let stats = scheduler.statistics();
    info!(
        active = stats.active_total,
        finished = stats.finished_total,
        "Docwatch stopped"
    );
    Ok(())
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}
