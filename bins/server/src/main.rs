//! Blobdrop service
//!
//! Watches the configured input folder and uploads every new matching file
//! to blob storage until interrupted.

mod logging;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use blobdrop_core::UploadService;
use blobdrop_core::storage::{StorageProvider, StorageService};
use blobdrop_shared::{AppConfig, AppResult, LoggingConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const SEPARATOR: &str = "====================================================================";

/// How long stop waits for an in-flight upload before giving up.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let loaded = AppConfig::load();

    let _guard = match logging::init(&logging_settings(&loaded)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("blobdrop: failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!("{SEPARATOR}");
    info!(version = env!("CARGO_PKG_VERSION"), "Application starts");
    if let Ok(dir) = std::env::current_dir() {
        info!(directory = %dir.display(), "Application directory");
    }

    let outcome = match loaded {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };
    let code = match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application terminated unexpectedly: {e:#}");
            ExitCode::FAILURE
        }
    };

    info!("{SEPARATOR}");
    code
}

/// Logging settings from `loaded`, or the defaults when configuration failed
/// so the failure itself still reaches the log file.
fn logging_settings(loaded: &AppResult<AppConfig>) -> LoggingConfig {
    loaded
        .as_ref()
        .map_or_else(|_| LoggingConfig::default(), |config| config.logging.clone())
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let provider = StorageProvider::from_settings(&config.storage)?;
    let store = StorageService::from_provider(provider)?;
    info!(
        provider = store.provider_name(),
        container = %config.storage.container,
        "Storage configured"
    );

    let mut service = UploadService::new(config.watch, Arc::new(store));
    let host = CancellationToken::new();

    service.start(&host)?;
    shutdown_signal().await;

    let grace = host.child_token();
    let deadline = grace.clone();
    tokio::spawn(async move {
        tokio::time::sleep(SHUTDOWN_GRACE).await;
        deadline.cancel();
    });

    service.stop(&grace).await;
    service.dispose();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
