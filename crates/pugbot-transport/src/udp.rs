//! UDP socket that receives a game server's streamed log.

use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::TransportError;

/// Largest datagram accepted from a game server.
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Listens for log datagrams on the address given to `logaddress_add`.
pub struct LogSocket {
    socket: UdpSocket,
}

impl LogSocket {
    /// Binds the listener to `addr` (`host:port`).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await.map_err(|source| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::info!(addr, "log listener bound");
        Ok(Self { socket })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.socket
            .local_addr()
            .map_err(TransportError::ReceiveFailed)
    }

    /// Waits for the next datagram and returns its raw bytes and sender.
    pub async fn recv(&self) -> Result<(Vec<u8>, SocketAddr), TransportError> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let (n, from) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        buf.truncate(n);
        Ok((buf, from))
    }
}
