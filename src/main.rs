use anyhow::Context;
use chrono::Utc;
use tokio::signal;
use tracing::{info, warn};

use supply_insights_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);
    api::handlers::health::init_start_time();

    let dataset = api::datasets::Dataset::load(cfg.dataset_path.as_deref(), Utc::now())
        .context("refusing to start with an unusable dataset")?;
    let counts = dataset.counts();
    info!(
        disruptions = counts.disruptions,
        forecast_series = counts.forecast_series,
        waste_items = counts.waste_items,
        "Dataset ready"
    );

    let addr = cfg.socket_addr()?;
    let state = api::AppState::new(cfg, dataset);
    let app = api::build_router(state);

    info!("supply-insights-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
