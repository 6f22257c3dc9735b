use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use redis_protocol::resp2::decode::decode;
use redis_protocol::resp2::encode::encode;
use redis_protocol::resp2::types::{OwnedFrame as RespFrame, Resp2Frame};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;

use super::handler::handle_command;
use crate::QueueRegistry;

/// Input buffered while a command is blocked. Past this the connection
/// stops reading until the command replies.
pub const MAX_PENDING_INPUT: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct RespConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RespConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6379,
        }
    }
}

/// RESP Server
pub struct RespServer {
    listener: TcpListener,
    registry: Arc<QueueRegistry>,
}

impl RespServer {
    pub async fn bind(config: RespConfig, registry: Arc<QueueRegistry>) -> io::Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;

        Ok(Self { listener, registry })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "relayq RESP server listening");

        tokio::pin!(shutdown);

        loop {
            let (socket, peer_addr) = tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                },
            };

            tracing::debug!(peer = %peer_addr, "New connection");

            let registry = self.registry.clone();
            let span = tracing::info_span!("connection", peer = %peer_addr);

            tokio::spawn(
                async move {
                    if let Err(e) = handle_connection(socket, registry).await {
                        tracing::error!("Connection error: {} (kind: {:?})", e, e.kind());
                    }
                }
                .instrument(span),
            );
        }
    }
}

async fn handle_connection(mut socket: TcpStream, registry: Arc<QueueRegistry>) -> io::Result<()> {
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        let n = socket.read_buf(&mut buffer).await?;
        if n == 0 {
            tracing::debug!("Connection closed by client");
            return Ok(());
        }

        loop {
            match decode(&buffer) {
                Ok(Some((frame, consumed))) => {
                    buffer.advance(consumed);
                    tracing::trace!(?frame, "Received frame");

                    let Some(response) =
                        run_until_disconnect(&mut socket, &mut buffer, &registry, frame).await?
                    else {
                        tracing::debug!("Client went away while a command was pending");
                        return Ok(());
                    };

                    tracing::trace!(?response, "Sending response");
                    write_frame(&mut socket, &response).await?;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Parse error: {:?}", e);
                    let error_response = RespFrame::Error(format!("ERR {}", e));
                    write_frame(&mut socket, &error_response).await?;

                    buffer.clear();
                    break;
                }
            }
        }
    }
}

/// Drives a command while watching the socket for EOF. Bytes that arrive in
/// the meantime stay in `buffer` for the next round, up to
/// [`MAX_PENDING_INPUT`]. Returns `None` if the peer disconnected first, in
/// which case the command future is dropped.
async fn run_until_disconnect(
    socket: &mut TcpStream,
    buffer: &mut BytesMut,
    registry: &Arc<QueueRegistry>,
    frame: RespFrame,
) -> io::Result<Option<RespFrame>> {
    let command = handle_command(frame, registry.clone());
    tokio::pin!(command);

    loop {
        if buffer.len() >= MAX_PENDING_INPUT {
            tracing::debug!(buffered = buffer.len(), "Input limit reached, pausing reads");
            return Ok(Some((&mut command).await));
        }

        tokio::select! {
            response = &mut command => return Ok(Some(response)),
            read = socket.read_buf(&mut *buffer) => {
                if read? == 0 {
                    return Ok(None);
                }
            }
        }
    }
}

async fn write_frame(socket: &mut TcpStream, frame: &RespFrame) -> io::Result<()> {
    let mut bytes = vec![0u8; frame.encode_len()];
    let written = encode(&mut bytes, frame).map_err(|e| {
        tracing::error!("Encode error: {:?}", e);
        io::Error::new(io::ErrorKind::InvalidData, format!("{:?}", e))
    })?;
    socket.write_all(&bytes[..written]).await
}
