mod alarm;
mod app;
mod backend;
mod config;
mod dashboard;
mod error;
mod input;
mod models;
mod report;
mod source;
mod utils;
mod view;

use log::{error, info};
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Duration;

use alarm::{AlarmController, TerminalBellBackend};
use app::Dashboard;
use backend::{BackendClient, SocketChannel};
use config::{DashboardConfig, SourceKind};
use report::ReportExporter;
use source::{SampleSource, SyntheticSource};
use utils::format_datetime;

const BELL_PERIOD_MILLIS: u64 = 1000;
const COMMAND_BUFFER: usize = 16;

async fn main_loop(
    config: DashboardConfig,
    shutdown: oneshot::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Starting {} dashboard at {}",
        config.device_name,
        format_datetime(&OffsetDateTime::now_utc())
    );

    let client = BackendClient::new(config.backend_url.clone());
    let alarm = AlarmController::new(Box::new(TerminalBellBackend::new(Duration::from_millis(
        BELL_PERIOD_MILLIS,
    ))));
    let exporter = ReportExporter::new(client.clone(), config.report_dir.clone());
    let mut dashboard = Dashboard::new(&config, alarm, exporter);

    let source: Box<dyn SampleSource> = match config.source {
        SourceKind::Live => {
            // Pull once, then follow the push channel
            match client.fetch_snapshot().await {
                Ok(snapshot) => dashboard.seed(snapshot),
                Err(e) => error!("Failed to load initial snapshot: {}", e),
            }
            Box::new(SocketChannel::new(
                client.base(),
                config.push_event.clone(),
                config.reconnect_delay,
            )?)
        }
        SourceKind::Synthetic => Box::new(SyntheticSource::new(config.synthetic_interval)),
    };

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    input::spawn_reader(command_tx);

    dashboard.run(source, command_rx, shutdown).await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match DashboardConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            // Keep the sender alive so the dashboard is not shut down
            std::future::pending::<()>().await;
        }
        let _ = tx.send(());
    });

    match main_loop(config, rx).await {
        Ok(_) => info!("Dashboard closed"),
        Err(e) => error!("Fatal error: {}", e),
    }

    Ok(())
}
