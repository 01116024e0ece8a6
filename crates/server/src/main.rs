use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fileforge_core::{
    create_status_channel, load_config_or_default, tool::check_tools, validate_config,
    ProcessToolRunner, ToolRunner,
};
use fileforge_server::api::{create_router, forward_status, StatusBroadcaster};
use fileforge_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long to wait for queued status events to reach clients on shutdown.
const FORWARDER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
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
    let config_path = std::env::var("FILEFORGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).context("Failed to serialize config")?;
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded"
    );

    match &config.output.folder {
        Some(folder) => info!("Output folder: {}", folder.display()),
        None => warn!("No output folder configured; batches will be rejected"),
    }

    for tool in check_tools(&config.tools) {
        if tool.available {
            info!(tool = tool.tool, program = %tool.program, "Tool available");
        } else {
            warn!(tool = tool.tool, program = %tool.program, "Tool not found");
        }
    }

    let runner: Arc<dyn ToolRunner> =
        Arc::new(ProcessToolRunner::with_timeout_secs(config.tools.timeout_secs));

    // Status events flow core mpsc -> broadcast -> WebSocket clients.
    let (status, status_rx) = create_status_channel(config.status.buffer_size);
    let broadcaster = StatusBroadcaster::new(config.status.buffer_size);
    let forwarder = tokio::spawn(forward_status(status_rx, broadcaster.clone()));

    let state = Arc::new(AppState::new(config.clone(), runner, status, broadcaster));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The forwarder exits once the last StatusSender (held by the router's
    // state) is dropped. Lingering WebSocket tasks may still hold one.
    info!("Server shutting down...");
    match tokio::time::timeout(FORWARDER_DRAIN_TIMEOUT, forwarder).await {
        Ok(Ok(())) => info!("Status forwarder stopped"),
        Ok(Err(e)) => warn!("Status forwarder ended abnormally: {}", e),
        Err(_) => warn!("Status forwarder still running at shutdown"),
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}
