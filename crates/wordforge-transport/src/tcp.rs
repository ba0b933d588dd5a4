//! TCP transport: listener, connection ids, and the reader/writer pumps.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::AbortHandle;
use tokio::time::timeout;

use crate::{ConnectionId, TransportError, TransportEvent};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Largest number of bytes handed to the event loop per read.
pub const READ_CHUNK: usize = 256;

/// Limits on what a connection may hold back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Messages queued for one peer before further sends are refused.
    pub write_queue: usize,

    /// How long a single socket write may stall before the writer gives up.
    pub write_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            write_queue: 64,
            write_timeout_ms: 10_000,
        }
    }
}

impl TransportConfig {
    /// Raises zero limits to one.
    pub fn validated(mut self) -> Self {
        self.write_queue = self.write_queue.max(1);
        self.write_timeout_ms = self.write_timeout_ms.max(1);
        self
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// A listening TCP socket.
pub struct TcpTransport {
    listener: TcpListener,
    config: TransportConfig,
}

impl TcpTransport {
    /// Binds a new listener to the given address.
    pub async fn bind(
        addr: SocketAddr,
        config: TransportConfig,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(%addr, "TCP transport listening");
        Ok(Self {
            listener,
            config: config.validated(),
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next connection and starts its I/O pumps.
    ///
    /// Everything the connection reads is reported on `events`.
    /// Cancel safe: if the future is dropped before a connection arrives,
    /// no connection is lost.
    pub async fn accept(
        &self,
        events: &mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Peer, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted TCP connection");

        let (read_half, write_half) = stream.into_split();
        let (queue_tx, queue_rx) = mpsc::channel(self.config.write_queue);

        tokio::spawn(write_loop(
            id,
            write_half,
            queue_rx,
            events.clone(),
            self.config.write_timeout(),
        ));
        let reader =
            tokio::spawn(read_loop(id, read_half, events.clone()))
                .abort_handle();

        Ok(Peer {
            id,
            addr,
            outbox: queue_tx,
            reader: Some(reader),
        })
    }
}

/// The server's handle to one connected client.
///
/// Sending never blocks: text is queued and written by a background task.
/// The queue is bounded, so a client that stops reading is refused output
/// instead of growing it. Dropping the `Peer` stops reading, flushes whatever
/// is still queued, and then closes the socket. Each write is bounded by the
/// transport's write timeout, so a stalled client cannot hold the socket
/// open forever.
#[derive(Debug)]
pub struct Peer {
    id: ConnectionId,
    addr: SocketAddr,
    outbox: mpsc::Sender<String>,
    reader: Option<AbortHandle>,
}

impl Peer {
    /// Builds a peer whose output goes to `outbox` instead of a socket.
    ///
    /// Used by in-process drivers (and tests) that want to observe exactly
    /// what a client would be sent.
    pub fn from_channel(
        id: ConnectionId,
        addr: SocketAddr,
        outbox: mpsc::Sender<String>,
    ) -> Self {
        Self {
            id,
            addr,
            outbox,
            reader: None,
        }
    }

    /// Returns the connection's identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the remote address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queues text for delivery.
    ///
    /// Fails with `QueueFull` when the client has fallen too far behind, and
    /// with `ConnectionClosed` once the writer has stopped, either because an
    /// earlier write failed or because the receiving side went away.
    pub fn send(&self, text: impl Into<String>) -> Result<(), TransportError> {
        self.outbox.try_send(text.into()).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull(format!(
                "{} has {} unsent messages",
                self.id,
                self.outbox.max_capacity()
            )),
            TrySendError::Closed(_) => TransportError::ConnectionClosed(
                format!("{} write queue closed", self.id),
            ),
        })
    }
}

impl Drop for Peer {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

async fn read_loop(
    id: ConnectionId,
    mut reader: OwnedReadHalf,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let event = match reader.read(&mut buf).await {
            Ok(0) => TransportEvent::Closed { id },
            Ok(n) => {
                tracing::trace!(%id, bytes = n, "read");
                TransportEvent::Received {
                    id,
                    data: buf[..n].to_vec(),
                }
            }
            Err(e) => TransportEvent::Failed {
                id,
                error: TransportError::ReceiveFailed(e),
            },
        };
        let last = !matches!(event, TransportEvent::Received { .. });
        if events.send(event).is_err() || last {
            break;
        }
    }
}

async fn write_loop(
    id: ConnectionId,
    mut writer: OwnedWriteHalf,
    mut queue: mpsc::Receiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
    write_timeout: Duration,
) {
    while let Some(text) = queue.recv().await {
        let written = timeout(write_timeout, writer.write_all(text.as_bytes()))
            .await
            .unwrap_or_else(|_| {
                Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"))
            });
        if let Err(e) = written {
            tracing::debug!(%id, error = %e, "write failed");
            // Dropping the queue makes every later `Peer::send` fail.
            drop(queue);
            let _ = events.send(TransportEvent::Failed {
                id,
                error: TransportError::SendFailed(e),
            });
            return;
        }
    }
    let _ = timeout(write_timeout, writer.shutdown()).await;
}
