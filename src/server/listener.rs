use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};

use crate::client::handle_client;
use crate::error::TransportError;
use crate::server::transport::{ListenerSpec, Transport, UserStore};

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// State shared by every session of one listener.
pub struct SessionContext {
    users: UserStore,
    max_logins: usize,
    active_logins: AtomicUsize,
}

impl SessionContext {
    pub fn new(users: UserStore, max_logins: usize) -> Self {
        Self {
            users,
            max_logins,
            active_logins: AtomicUsize::new(0),
        }
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn max_logins(&self) -> usize {
        self.max_logins
    }

    pub fn active_logins(&self) -> usize {
        self.active_logins.load(Ordering::SeqCst)
    }

    /// Claims a login slot. Returns false once `max_logins` sessions hold one.
    pub fn try_acquire_login(&self) -> bool {
        self.active_logins
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current < self.max_logins).then_some(current + 1)
            })
            .is_ok()
    }

    pub fn release_login(&self) {
        let _ = self
            .active_logins
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| current.checked_sub(1));
    }
}

struct RunningListener {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Control-connection FTP transport on top of tokio.
#[derive(Default)]
pub struct FtpTransport {
    running: Option<RunningListener>,
}

impl FtpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_listening(&self) -> bool {
        self.running.is_some()
    }
}

impl Transport for FtpTransport {
    async fn start(&mut self, spec: ListenerSpec) -> Result<SocketAddr, TransportError> {
        // A leftover listener would keep the port; release it first.
        self.stop().await;

        let addr = spec.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(TransportError::LocalAddr)?;

        info!(
            "Listening on {} ({} accounts, max {} logins)",
            local_addr,
            spec.users.len(),
            spec.max_logins
        );

        let context = Arc::new(SessionContext::new(spec.users, spec.max_logins));
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(accept_loop(listener, context, shutdown_rx));

        self.running = Some(RunningListener { shutdown, task });
        Ok(local_addr)
    }

    async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(());
        if let Err(e) = running.task.await {
            warn!("Listener task ended abnormally: {}", e);
        }
        info!("Listener closed");
    }
}

/// Accepts connections until shutdown, one task per client. On exit the
/// listener is dropped and every open session is aborted.
async fn accept_loop(
    listener: TcpListener,
    context: Arc<SessionContext>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut sessions = JoinSet::new();
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    failures = 0;
                    let context = Arc::clone(&context);
                    // Spawn a task for each client so accept loop doesn't block
                    sessions.spawn(serve(stream, addr, context));
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = accept_backoff(failures);
                    error!("Error accepting connection: {} (retrying in {:?})", e, delay);
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            },
            Some(_) = sessions.join_next(), if !sessions.is_empty() => {}
        }
    }

    drop(listener);
    sessions.shutdown().await;
}

/// Delay before the next accept after `failures` consecutive errors.
/// Doubles from `ACCEPT_BACKOFF_MIN` up to `ACCEPT_BACKOFF_MAX`.
fn accept_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_MIN
        .saturating_mul(1 << exponent)
        .min(ACCEPT_BACKOFF_MAX)
}

async fn serve(stream: TcpStream, addr: SocketAddr, context: Arc<SessionContext>) {
    if let Err(e) = handle_client(stream, addr, context).await {
        warn!("Failed to handle client {}: {}", addr, e);
    }
}
