use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bus_alert_server::alert::AlertReceiver;
use bus_alert_server::config::AlertConfig;
use bus_alert_server::registry::ManagerRegistry;
use bus_alert_server::scheduler::ArrivalSource;
use bus_alert_server::tfl::{MockArrivalSource, TflClient};
use bus_alert_server::web::{AppState, create_router};

/// Config file used when `BUS_ALERT_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "bus_alert.toml";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path =
        std::env::var("BUS_ALERT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match AlertConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %config_path, error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let result = match std::env::var("BUS_ALERT_MOCK_DIR") {
        Ok(dir) => {
            warn!(dir = %dir, "Serving mock arrivals instead of TfL");
            match MockArrivalSource::from_dir(&dir) {
                Ok(source) => run(config, source).await,
                Err(e) => Err(e.into()),
            }
        }
        Err(_) => match TflClient::new(config.tfl.clone()) {
            Ok(client) => run(config, client).await,
            Err(e) => Err(e.into()),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Bus arrival alert server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run<S: ArrivalSource + Clone>(config: AlertConfig, source: S) -> Result<(), BoxError> {
    let registry = Arc::new(ManagerRegistry::new(source));

    tokio::spawn(log_alerts(registry.subscribe()));

    for entry in &config.entries {
        registry.setup(entry).await;
    }
    if config.entries.is_empty() {
        warn!("No entries configured, nothing will be polled");
    }

    let app = create_router(AppState::new(Arc::clone(&registry)));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "Bus arrival alert server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.unload_all().await;
    info!("Shut down cleanly");
    Ok(())
}

/// Stand-in for a host event bus: write every alert to the log.
async fn log_alerts(mut alerts: AlertReceiver) {
    loop {
        match alerts.recv().await {
            Ok(alert) => match serde_json::to_string(&alert) {
                Ok(payload) => info!(event = alert.event_name(), %payload, "Alert"),
                Err(e) => warn!(error = %e, "Failed to serialize alert"),
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Alert logger fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
