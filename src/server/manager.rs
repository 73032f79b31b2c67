//! Server lifecycle
//!
//! `LifecycleManager` owns the Stopped/Running state, applies configuration,
//! drives the transport and publishes every transition to status observers.
//! All transitions run under one async mutex, so concurrent callers observe
//! them in a single order.

use log::{error, info, warn};
use std::net::SocketAddr;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::ServerError;
use crate::server::config::ServerConfig;
use crate::server::status::{StatusBroadcaster, StatusEvent, StatusObserver};
use crate::server::transport::{ListenerSpec, Transport, TransportUser, UserStore};
use crate::storage::{ProvisioningFailure, ensure_home_directory, provision_home_directories};

/// Outcome of a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    pub local_addr: SocketAddr,
    /// Accounts left out of the user store because their home directory
    /// could not be created.
    pub provisioning_failures: Vec<ProvisioningFailure>,
}

impl StartReport {
    pub fn is_complete(&self) -> bool {
        self.provisioning_failures.is_empty()
    }
}

struct ManagerState<T> {
    transport: T,
    config: ServerConfig,
    running: bool,
    last_report: Option<StartReport>,
}

/// Running/Stopped state machine in front of a [`Transport`].
pub struct LifecycleManager<T: Transport> {
    state: Mutex<ManagerState<T>>,
    status: StatusBroadcaster,
}

impl<T: Transport> LifecycleManager<T> {
    pub fn new(transport: T, config: ServerConfig) -> Self {
        Self {
            state: Mutex::new(ManagerState {
                transport,
                config,
                running: false,
                last_report: None,
            }),
            status: StatusBroadcaster::new(),
        }
    }

    /// Registers an observer notified from its own thread.
    pub fn add_status_observer<O: StatusObserver>(&self, observer: O) {
        self.status.add_observer(observer);
    }

    /// Registers a queue of status events for async consumers.
    pub fn subscribe(&self) -> UnboundedReceiver<StatusEvent> {
        self.status.subscribe()
    }

    /// Starts serving `config`. Fails with [`ServerError::AlreadyRunning`]
    /// without touching state if the server is up.
    pub async fn start(&self, config: ServerConfig) -> Result<StartReport, ServerError> {
        let mut state = self.state.lock().await;
        self.start_locked(&mut state, config).await
    }

    /// Starts with the configuration currently held, read under the same lock
    /// as the start itself.
    pub async fn start_current(&self) -> Result<StartReport, ServerError> {
        let mut state = self.state.lock().await;
        let config = state.config.clone();
        self.start_locked(&mut state, config).await
    }

    /// Stops the transport. Returns false, and publishes nothing, if already stopped.
    pub async fn stop(&self) -> bool {
        let mut state = self.state.lock().await;
        self.halt(&mut state).await
    }

    /// Installs `config`. When running, this is a restart with the new
    /// configuration; a failed restart leaves the manager stopped.
    pub async fn update_config(&self, config: ServerConfig) -> Result<Option<StartReport>, ServerError> {
        let mut state = self.state.lock().await;
        if !state.running {
            state.config = config;
            info!("Configuration updated while stopped");
            return Ok(None);
        }

        self.halt(&mut state).await;
        match self.launch(&mut state, config.clone()).await {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                state.config = config;
                self.status.publish(false, format!("Failed to restart server: {}", e));
                Err(e)
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.running
    }

    pub async fn config(&self) -> ServerConfig {
        self.state.lock().await.config.clone()
    }

    /// Report of the most recent successful start.
    pub async fn last_report(&self) -> Option<StartReport> {
        self.state.lock().await.last_report.clone()
    }

    async fn start_locked(
        &self,
        state: &mut ManagerState<T>,
        config: ServerConfig,
    ) -> Result<StartReport, ServerError> {
        if state.running {
            warn!("Start requested while already running");
            return Err(ServerError::AlreadyRunning);
        }

        match self.launch(state, config).await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.status.publish(false, format!("Failed to start server: {}", e));
                Err(e)
            }
        }
    }

    async fn launch(&self, state: &mut ManagerState<T>, config: ServerConfig) -> Result<StartReport, ServerError> {
        config.validate()?;
        let port = config.validated_port()?;

        let (ready, provisioning_failures) = provision_home_directories(&config.accounts);
        let mut users = UserStore::new();
        for account in ready {
            users.insert(TransportUser::from_account(account));
        }

        if config.anonymous_enabled {
            match ensure_home_directory(&config.base_folder) {
                Ok(()) => users.enable_anonymous(TransportUser::anonymous(&config.base_folder)),
                Err(e) => warn!(
                    "Anonymous access disabled, base folder {} unavailable: {}",
                    config.base_folder.display(),
                    e
                ),
            }
        }

        let spec = ListenerSpec {
            bind_address: config.bind_address.clone(),
            port,
            max_logins: config.max_concurrent_logins,
            users,
        };

        let local_addr = match state.transport.start(spec).await {
            Ok(addr) => addr,
            Err(e) => {
                error!("Failed to start transport on {}: {}", config.control_socket(), e);
                state.transport.stop().await;
                return Err(e.into());
            }
        };

        let report = StartReport {
            local_addr,
            provisioning_failures,
        };

        state.running = true;
        state.config = config;
        state.last_report = Some(report.clone());

        self.status.publish(true, started_message(&report));
        Ok(report)
    }

    async fn halt(&self, state: &mut ManagerState<T>) -> bool {
        if !state.running {
            return false;
        }
        state.transport.stop().await;
        state.running = false;
        self.status.publish(false, "Server stopped");
        true
    }
}

fn started_message(report: &StartReport) -> String {
    if report.is_complete() {
        return format!("Server started on {}", report.local_addr);
    }
    let names: Vec<&str> = report
        .provisioning_failures
        .iter()
        .map(|f| f.username.as_str())
        .collect();
    format!(
        "Server started on {} ({} account(s) without a home directory: {})",
        report.local_addr,
        names.len(),
        names.join(", ")
    )
}
