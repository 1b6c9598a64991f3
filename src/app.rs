use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use leadflow_api::{create_app, AppState};
use leadflow_config::AppConfig;
use leadflow_dispatcher::{BatchReport, DispatcherSettings, FollowupDispatcher};
use leadflow_domain::LeadPipelineService;
use leadflow_infrastructure::{
    observability::init_metrics, DatabaseManager, HttpMessageSender, MetricsCollector,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

/// How the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// One batch, report on stdout, exit.
    Dispatch,
    /// HTTP server until shutdown.
    Api,
}

impl std::str::FromStr for AppMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dispatch" => Ok(AppMode::Dispatch),
            "api" => Ok(AppMode::Api),
            other => Err(anyhow::anyhow!("Unsupported mode: {other}")),
        }
    }
}

pub struct Application {
    config: AppConfig,
    database: DatabaseManager,
    dispatcher: Arc<FollowupDispatcher>,
    pipeline: Arc<LeadPipelineService>,
    prometheus: Option<PrometheusHandle>,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // The recorder has to exist before the collector registers its handles.
        let prometheus = if config.observability.metrics_enabled {
            Some(init_metrics()?)
        } else {
            None
        };
        let metrics = Arc::new(MetricsCollector::new()?);

        let database = DatabaseManager::new(&config.database)
            .await
            .with_context(|| format!("Failed to open database {}", config.database.url))?;

        let sender = HttpMessageSender::new(&config.sender)
            .context("Failed to build message sender")?;
        info!(sender.endpoint = %sender.endpoint(), "Message channel configured");

        let dispatcher = FollowupDispatcher::new(
            database.followup_task_repository(),
            database.client_repository(),
            database.template_repository(),
            database.agent_repository(),
            Arc::new(sender),
            Arc::clone(&metrics),
            DispatcherSettings::from(&config.dispatcher),
        );
        let pipeline = LeadPipelineService::new(database.lead_repository(), metrics);

        Ok(Self {
            config,
            database,
            dispatcher: Arc::new(dispatcher),
            pipeline: Arc::new(pipeline),
            prometheus,
        })
    }

    /// Runs exactly one batch. Only a failure to read the due list is an `Err`.
    pub async fn run_dispatch(&self, now: DateTime<Utc>) -> Result<BatchReport> {
        let report = self
            .dispatcher
            .run_batch(now)
            .await
            .context("Follow-up batch failed")?;
        Ok(report)
    }

    pub async fn run_api(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let state = AppState {
            dispatcher: Arc::clone(&self.dispatcher),
            pipeline: Arc::clone(&self.pipeline),
            prometheus: self.prometheus.clone(),
        };
        let app = create_app(state, &self.config.api);

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.api.bind_address))?;
        info!("API server listening on http://{}", self.config.api.bind_address);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API server received shutdown signal");
            })
            .await
            .context("API server failed")?;

        info!("API server stopped");
        Ok(())
    }

    pub async fn close(&self) {
        self.database.close().await;
    }
}
