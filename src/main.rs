//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use leadboard::adapters::api::ApiLeadSource;
use leadboard::adapters::persistence::{FilterStateJson, JsonSnapshotSource};
use leadboard::adapters::ui::tui::TuiInputPort;
use leadboard::ports::{FilterStatePort, InputPort, LeadSourcePort};
use leadboard::shared::config::AppConfig;
use leadboard::usecases::{DashboardService, ReportService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    leadboard::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    let data_path = cfg.data_dir_or_default();
    tokio::fs::create_dir_all(&data_path)
        .await
        .map_err(|e| anyhow::anyhow!("create data dir {}: {}", data_path.display(), e))?;
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");

    // --- Lead source: REST backend when configured, JSON export otherwise ---
    let source: Arc<dyn LeadSourcePort> = if cfg.is_api_configured() {
        let timeout = Duration::from_secs(cfg.request_timeout_secs_or_default());
        info!(url = %cfg.api_base_url_or_default(), "using CRM backend");
        if cfg.api_token.is_none() {
            warn!("LEADBOARD_API_TOKEN not set, requests are unauthenticated");
        }
        Arc::new(
            ApiLeadSource::new(cfg.api_base_url_or_default(), cfg.api_token.clone(), timeout)
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    } else {
        let path = cfg.snapshot_path_or_default();
        info!(path = %path.display(), "using JSON snapshot");
        Arc::new(JsonSnapshotSource::new(path))
    };

    // --- Filter memory ---
    let state_impl = FilterStateJson::new(cfg.state_path());
    state_impl
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let state: Arc<dyn FilterStatePort> = Arc::new(state_impl);

    // --- Services ---
    let dashboard_service = Arc::new(DashboardService::new(source, state));
    let report_service = Arc::new(ReportService::new(cfg.reports_dir()));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::clone(&dashboard_service),
        Arc::clone(&report_service),
        cfg.user_id(),
    ));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("bye");
    Ok(())
}
