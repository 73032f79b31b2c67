//! FTP gatekeeper - Entry Point
//!
//! Loads the persisted configuration, starts the server and runs until Ctrl-C.

use log::{error, info, warn};

use ftp_gatekeeper::server::StatusEvent;
use ftp_gatekeeper::utils::logging::setup_logging;
use ftp_gatekeeper::{ConfigStore, FtpTransport, LifecycleManager};

#[tokio::main]
async fn main() {
    setup_logging();

    let store = ConfigStore::default_location();
    if !store.exists() {
        info!("No saved configuration in {}, using defaults", store.dir().display());
    }
    let loaded = store.load();
    info!("Launching FTP server (theme: {})...", loaded.theme);

    let manager = LifecycleManager::new(FtpTransport::new(), loaded.server);
    manager.add_status_observer(|event: &StatusEvent| {
        let state = if event.running { "RUNNING" } else { "STOPPED" };
        println!("[{}] {}", state, event.message);
    });

    match manager.start_current().await {
        Ok(report) => {
            for failure in &report.provisioning_failures {
                warn!("Account {} is unavailable: {}", failure.username, failure.reason);
            }
        }
        Err(e) => {
            error!("Server failed to start: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down...");
    manager.stop().await;
}
