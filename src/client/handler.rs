use log::{debug, error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

use crate::client::Session;
use crate::protocol::{CommandStatus, handle_command, parse_command};
use crate::server::listener::SessionContext;

const MAX_COMMAND_LENGTH: usize = 512;

/// How long an unauthenticated connection may sit silent.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Handles one FTP control connection using Tokio async runtime.
///
/// - Uses BufReader to read command lines from the client.
/// - Applies the logged-in user's idle limit as a read timeout.
/// - Dispatches commands using `handle_command`.
/// - Returns the session's login slot however the connection ends.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    context: Arc<SessionContext>,
) -> io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut session = Session::default();

    let outcome = run_session(
        BufReader::new(read_half),
        &mut write_half,
        &mut session,
        client_addr,
        &context,
    )
    .await;

    if session.is_logged_in() {
        context.release_login();
    }
    info!("Client {} disconnected", client_addr);
    outcome
}

async fn run_session(
    mut reader: BufReader<OwnedReadHalf>,
    write_half: &mut OwnedWriteHalf,
    session: &mut Session,
    client_addr: SocketAddr,
    context: &SessionContext,
) -> io::Result<()> {
    let mut line = Vec::new();
    // Set while the tail of an overlong line is still arriving.
    let mut discarding = false;

    write_half
        .write_all(b"220 Welcome to the FTP gatekeeper\r\n")
        .await?;
    write_half.flush().await?;

    loop {
        line.clear();
        let limit = if session.is_logged_in() {
            session.idle_timeout()
        } else {
            Some(LOGIN_TIMEOUT)
        };

        let read = match limit {
            Some(limit) => match timeout(limit, read_bounded_line(&mut reader, &mut line)).await {
                Ok(read) => read,
                Err(_) => {
                    info!("Client {} idle for {:?}, disconnecting", client_addr, limit);
                    write_half
                        .write_all(b"421 Idle timeout, closing control connection\r\n")
                        .await?;
                    return Ok(());
                }
            },
            None => read_bounded_line(&mut reader, &mut line).await,
        };

        match read {
            Ok(0) => {
                // Client closed the connection
                info!("Connection closed by client {}", client_addr);
                return Ok(());
            }
            Ok(_) => {
                let complete = line.ends_with(b"\n");
                if discarding {
                    discarding = !complete;
                    continue;
                }

                // Enforce command length limit
                if line.len() > MAX_COMMAND_LENGTH {
                    discarding = !complete;
                    write_half.write_all(b"500 Command too long\r\n").await?;
                    continue;
                }

                let line = String::from_utf8_lossy(&line);
                let command = parse_command(&line);
                debug!("Received from {}: {}", client_addr, command);

                let result = handle_command(session, &command, context);
                if let Some(msg) = &result.message {
                    write_half.write_all(msg.as_bytes()).await?;
                }

                if let CommandStatus::CloseConnection = result.status {
                    info!("Closing connection to {}", client_addr);
                    return Ok(());
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                return Err(e);
            }
        }
    }
}

/// Reads up to one line, never buffering more than one byte past
/// `MAX_COMMAND_LENGTH`. A longer line comes back without its newline.
async fn read_bounded_line<R>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_COMMAND_LENGTH as u64 + 1;
    reader.take(limit).read_until(b'\n', line).await
}
