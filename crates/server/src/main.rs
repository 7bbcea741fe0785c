mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reaparr_core::{
    load_config, validate_config, FileSettingsProvider, HttpStarrClient, JsonStateStore,
    RemovedLedger, SettingsProvider, StarrClient, StrikeStore, SweepOrchestrator, SweepTarget,
    TallyFile,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Floor for the scheduler interval so a zeroed config cannot busy-loop.
const MIN_SLEEP_SECS: u64 = 60;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("REAPARR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("State root: {:?}", config.state.root);

    // Strike records and the removed ledger share one store on disk
    let store = Arc::new(JsonStateStore::new(&config.state.root));
    let settings: Arc<dyn SettingsProvider> =
        Arc::new(FileSettingsProvider::new(&config_path, config.sweep.clone()));
    let tally = TallyFile::new(&config.state.root);

    // Build one API client per configured instance
    let mut targets = Vec::new();
    for instance in &config.instances {
        info!(
            "Configured {} instance '{}' (sweep {})",
            instance.app,
            instance.name,
            if instance.enabled { "enabled" } else { "disabled" }
        );
        let client: Arc<dyn StarrClient> = Arc::new(HttpStarrClient::new(
            instance.app,
            &instance.api_url,
            &instance.api_key,
            Duration::from_secs(instance.timeout_secs),
        ));
        targets.push(SweepTarget {
            app: instance.app,
            instance_name: instance.name.clone(),
            enabled: instance.enabled,
            client,
        });
    }

    let orchestrator = Arc::new(
        SweepOrchestrator::new(
            targets,
            Arc::clone(&settings),
            Arc::clone(&store) as Arc<dyn StrikeStore>,
            store as Arc<dyn RemovedLedger>,
        )
        .with_tally(tally),
    );

    // Start the sweep scheduler
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let scheduler = spawn_scheduler(
        Arc::clone(&orchestrator),
        Arc::clone(&settings),
        shutdown_tx.subscribe(),
    );

    // Create app state
    let app_state = Arc::new(AppState::new(config.clone(), orchestrator));

    // Create router
    let app = create_router(app_state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting Reaparr {} on {}", VERSION, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    let _ = shutdown_tx.send(());
    let _ = scheduler.await;
    info!("Sweep scheduler stopped");

    Ok(())
}

/// Runs sweep cycles until shutdown. The first cycle starts immediately,
/// later ones wait out the configured sleep interval.
fn spawn_scheduler(
    orchestrator: Arc<SweepOrchestrator>,
    settings: Arc<dyn SettingsProvider>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Sweep scheduler started");
        loop {
            orchestrator.run_cycle().await;

            // Re-read the interval each pass, it is live-reloadable
            let sleep_secs = settings.snapshot().sleep_duration_secs.max(MIN_SLEEP_SECS);
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = tokio::time::sleep(Duration::from_secs(sleep_secs)) => {}
            }
        }
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
