//! Headless dashboard host
//!
//! Runs the controller against the live API, reads input bindings from
//! stdin (`period 1h`, `ma off`, `refresh`, `quit`, ...) and, when
//! `DASHBOARD_OUTPUT` is set, keeps a rendered HTML page on disk.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use eth_dashboard::{ApiClient, Command, Config, Dashboard, MemoryDocument, render_page};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    init_logging(&config.log_level);

    info!(
        api_base = %config.api_base,
        period = %config.default_period,
        poll_ms = config.poll_interval_ms,
        policy = ?config.overlap_policy,
        "Starting ETH dashboard"
    );

    let feed = ApiClient::new(&config).context("Failed to build HTTP client")?;
    let document = Arc::new(MemoryDocument::new());
    let dashboard = Arc::new(Dashboard::new(feed, Arc::clone(&document), config.clone()));

    if let Err(e) = dashboard.check_backend().await {
        warn!(error = %e, "Backend status probe failed");
    }

    // The poll keeps running after a failed initial load
    if let Err(e) = dashboard.start().await {
        error!(error = %e, "Initial load failed");
    }
    let mut poller = dashboard.start_polling();

    let output = config.output_path.clone();
    let page_refresh = config.poll_interval();
    let mut page_ticker = tokio::time::interval(page_refresh);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<Command>() {
                    Ok(Command::Quit) => {
                        info!("Quit requested");
                        break;
                    }
                    Ok(command) => {
                        if let Err(e) = dashboard.handle(command).await {
                            warn!(?command, error = %e, "Command failed");
                        }
                    }
                    Err(e) => warn!(input = %line.trim(), error = %e, "Ignoring input"),
                },
                Ok(None) => {
                    info!("stdin closed, input bindings disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "stdin read failed, input bindings disabled");
                    stdin_open = false;
                }
            },
            _ = page_ticker.tick(), if output.is_some() => {
                if let Some(path) = &output {
                    write_page(&document, path, page_refresh).await;
                }
            }
        }
    }

    poller.stop();
    if let Some(path) = &output {
        write_page(&document, path, Duration::ZERO).await;
    }

    info!("Shutdown complete");
    Ok(())
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn write_page(document: &MemoryDocument, path: &Path, refresh: Duration) {
    let page = render_page(document, refresh);
    if let Err(e) = tokio::fs::write(path, page).await {
        error!(path = %path.display(), error = %e, "Failed to write dashboard page");
    }
}
