use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{error, info, warn};

use leadflow::app::{AppMode, Application};
use leadflow::common::{init_logging, load_config, wait_for_shutdown_signal};
use leadflow::shutdown::ShutdownManager;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Parser)]
#[command(name = "leadflow", version, about = "Lead pipeline and follow-up dispatcher")]
struct Cli {
    /// Configuration file (TOML). Falls back to config/leadflow.toml when present.
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    #[arg(short, long, value_name = "MODE", default_value = "dispatch",
          value_parser = ["dispatch", "api"])]
    mode: String,

    /// Reference time for the batch (RFC 3339). Defaults to the current time.
    #[arg(long, value_name = "RFC3339")]
    now: Option<DateTime<Utc>>,

    /// Overrides observability.log_level.
    #[arg(short, long, value_name = "LEVEL",
          value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    #[arg(long, value_name = "FORMAT", default_value = "pretty",
          value_parser = ["json", "pretty"])]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    init_logging(&log_level, &cli.log_format)?;

    let mode: AppMode = cli.mode.parse()?;
    if mode == AppMode::Api && !config.api.enabled {
        return Err(anyhow::anyhow!("API mode is disabled in the configuration"));
    }
    info!(mode = ?mode, config = ?cli.config, "Starting leadflow");

    let app = Arc::new(Application::new(config).await?);

    let code = match mode {
        AppMode::Dispatch => run_dispatch(&app, cli.now).await?,
        AppMode::Api => {
            run_api(Arc::clone(&app)).await?;
            ExitCode::SUCCESS
        }
    };

    app.close().await;
    Ok(code)
}

async fn run_dispatch(app: &Application, now: Option<DateTime<Utc>>) -> Result<ExitCode> {
    let now = now.unwrap_or_else(Utc::now);
    match app.run_dispatch(now).await {
        Ok(report) => {
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Dispatch aborted: {e:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_api(app: Arc<Application>) -> Result<()> {
    let shutdown = ShutdownManager::new();
    let mut server = {
        let app = Arc::clone(&app);
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move { app.run_api(shutdown_rx).await })
    };

    tokio::select! {
        result = &mut server => {
            // Exited on its own, e.g. the bind failed.
            return result.context("API server task panicked")?;
        }
        _ = wait_for_shutdown_signal() => {}
    }

    info!("Shutting down gracefully");
    shutdown.shutdown();

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(result) => result.context("API server task panicked")?,
        Err(_) => {
            warn!("Graceful shutdown timed out, exiting");
            Ok(())
        }
    }
}
