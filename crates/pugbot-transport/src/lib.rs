//! Socket plumbing for pugbot.
//!
//! Provides the [`Connection`] trait that the RCON layer reads and writes
//! through, a TCP implementation of it ([`TcpConnection`]), and the UDP
//! [`LogSocket`] that game servers stream their event log to.
//!
//! A `Connection` hands out bytes exactly as the socket delivers them. TCP
//! has no message boundaries, so one `recv` may return half a packet or a
//! packet and a half. Reassembly is the caller's job.
//!
//! # Feature Flags
//!
//! - `test-util`: exposes [`mock::ScriptedConnection`], an in-memory
//!   connection that replays scripted reads

mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod tcp;
mod udp;

pub use error::TransportError;
pub use tcp::{TcpConnection, READ_BUFFER_SIZE};
pub use udp::{LogSocket, MAX_DATAGRAM_SIZE};

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single stream connection that can send and receive bytes.
///
/// Methods return `Send` futures so a connection can be driven from
/// spawned Tokio tasks even when the caller is generic over it.
pub trait Connection: Send + Sync + 'static {
    /// Writes all of `data` to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives whatever the next socket read yields.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the write side of the connection.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// The local endpoint of the connection.
    ///
    /// The game server streams its log back to this address, so it has
    /// to be the interface the server can actually reach.
    fn local_addr(&self) -> SocketAddr;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new(1), "sydney-1");
        map.insert(ConnectionId::new(2), "sydney-2");
        assert_eq!(map[&ConnectionId::new(1)], "sydney-1");
    }
}
