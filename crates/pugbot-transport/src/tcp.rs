//! TCP [`Connection`] used for RCON.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Size of the buffer handed to each socket read.
///
/// One maximum-size RCON packet (4106 bytes) plus its length prefix.
pub const READ_BUFFER_SIZE: usize = 4110;

/// A TCP stream split into independently locked halves, so a task
/// blocked in `recv` never holds up a writer.
pub struct TcpConnection {
    id: ConnectionId,
    local: SocketAddr,
    peer: SocketAddr,
    reader: Mutex<OwnedReadHalf>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpConnection {
    /// Opens a TCP connection to `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await.map_err(|source| {
            TransportError::ConnectFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        Self::from_stream(stream).map_err(|source| {
            TransportError::ConnectFailed {
                addr: addr.to_string(),
                source,
            }
        })
    }

    /// Wraps an already connected stream.
    pub fn from_stream(stream: TcpStream) -> std::io::Result<Self> {
        let local = stream.local_addr()?;
        let peer = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();
        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %local, %peer, "tcp connection established");

        Ok(Self {
            id,
            local,
            peer,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        })
    }

    /// The remote endpoint.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let n = self
            .reader
            .lock()
            .await
            .read(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn local_addr(&self) -> SocketAddr {
        self.local
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
