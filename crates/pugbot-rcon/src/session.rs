//! The RCON session: one authenticated conversation with a game server.
//!
//! A session tracks:
//! - WHERE it stands (connected, authenticated, disconnected)
//! - WHICH request id was handed out last
//! - WHAT bytes arrived past the end of the last frame it decoded

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use pugbot_protocol::{
    LENGTH_PREFIX_SIZE, MAX_PACKET_SIZE, MIN_PACKET_SIZE, Packet, PacketKind,
    RequestId, declared_length, decode, encode,
};
use pugbot_transport::{Connection, TransportError};
use tokio::time::Instant;

use crate::RconError;

/// How long a single write may block.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to wait for the server to answer the password handshake.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to wait for a command reply in steady state.
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle of a session.
///
/// ```text
///   Connected ──(authenticate)──→ Authenticated
///       │                              │
///       └──────(I/O or framing error)──┴──→ Disconnected
/// ```
///
/// `Disconnected` is terminal. There is no reconnect inside a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Socket is open, password not yet accepted.
    Connected,

    /// Password accepted. `local_addr` is the endpoint the server can
    /// reach us on, used to point its log stream back at us.
    Authenticated { local_addr: SocketAddr },

    /// The session failed and stopped talking to the server.
    Disconnected { reason: String },
}

// ---------------------------------------------------------------------------
// RconSession
// ---------------------------------------------------------------------------

/// An RCON conversation over a single [`Connection`].
///
/// All methods take `&self`, so one session can be shared (behind an
/// `Arc`) by the task draining replies and the tasks issuing commands.
/// Reads are single-flight: the reassembly buffer is held under an async
/// mutex for the whole of a read, so concurrent readers queue up instead
/// of tearing frames apart.
pub struct RconSession<C> {
    conn: C,

    /// Last id handed out. Starts at [`RequestId::MAX`] so the auth
    /// packet goes out as id 0.
    last_id: AtomicI32,

    /// Bytes received past the end of the last decoded frame.
    queued: tokio::sync::Mutex<Vec<u8>>,

    state: Mutex<SessionState>,
}

impl<C: Connection> RconSession<C> {
    /// Wraps an open connection. Call [`authenticate`](Self::authenticate)
    /// before issuing commands.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            last_id: AtomicI32::new(RequestId::MAX.0),
            queued: tokio::sync::Mutex::new(Vec::new()),
            state: Mutex::new(SessionState::Connected),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    /// Returns `true` once the password handshake has succeeded and the
    /// session has not failed since.
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.lock_state(), SessionState::Authenticated { .. })
    }

    /// The local endpoint recorded during authentication.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match *self.lock_state() {
            SessionState::Authenticated { local_addr } => Some(local_addr),
            _ => None,
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Logs in with the RCON password.
    ///
    /// Some servers send an empty `RESPONSE_VALUE` before the real
    /// `AUTH_RESPONSE`; one such packet is skipped. Anything else in the
    /// first reply is rejected straight away.
    ///
    /// # Errors
    /// - [`RconError::InvalidAuthResponse`]: the reply was not an auth
    ///   response
    /// - [`RconError::AuthFailed`]: the reply did not echo our id
    ///   (wrong password)
    /// - I/O and framing errors, which also end the session
    pub async fn authenticate(
        &self,
        password: &str,
    ) -> Result<SocketAddr, RconError> {
        self.ensure_live()?;

        let id = self.next_request_id();
        let packet = Packet::new(PacketKind::AUTH, id, password);
        self.write_packet(&packet).await?;

        let mut reply = self.read_response(AUTH_TIMEOUT).await?;
        if reply.kind == PacketKind::RESPONSE_VALUE {
            tracing::debug!(
                request_id = %reply.request_id,
                "skipping response value sent ahead of auth response"
            );
            reply = self.read_response(AUTH_TIMEOUT).await?;
        }

        if reply.kind != PacketKind::AUTH_RESPONSE {
            tracing::warn!(kind = %reply.kind, "unexpected reply to auth");
            return Err(RconError::InvalidAuthResponse(reply.kind));
        }
        if reply.request_id != id {
            tracing::warn!(
                expected = %id,
                got = %reply.request_id,
                "rcon password rejected"
            );
            return Err(RconError::AuthFailed);
        }

        let local_addr = self.conn.local_addr();
        *self.lock_state() = SessionState::Authenticated { local_addr };
        tracing::info!(conn = %self.conn.id(), %local_addr, "rcon authenticated");
        Ok(local_addr)
    }

    /// Sends a console command without waiting for its reply.
    ///
    /// A failed write marks the session disconnected. The error is still
    /// returned so the caller can log it, but nothing needs handling.
    pub async fn execute(&self, command: &str) -> Result<RequestId, RconError> {
        self.ensure_live()?;
        if !self.is_authenticated() {
            return Err(RconError::NotAuthenticated);
        }

        let id = self.next_request_id();
        let packet = Packet::new(PacketKind::EXEC, id, command);
        self.write_packet(&packet).await?;
        tracing::debug!(conn = %self.conn.id(), request_id = %id, command, "sent rcon command");
        Ok(id)
    }

    /// Reads the next complete reply frame.
    ///
    /// A socket read may return part of a frame, exactly one, or one and
    /// the start of the next. Bytes past the current frame are kept and
    /// consumed by the next call before the socket is read again.
    ///
    /// # Errors
    /// - [`RconError::UnexpectedFormat`] / [`RconError::ResponseTooLong`]
    ///   if the declared length is out of range (fatal)
    /// - [`RconError::ConnectionClosed`] / [`RconError::Io`] (fatal)
    /// - [`RconError::Timeout`] if no complete frame arrived in time. The
    ///   partial frame is kept for the next call.
    pub async fn read_response(
        &self,
        timeout: Duration,
    ) -> Result<Packet, RconError> {
        self.ensure_live()?;

        let deadline = Instant::now() + timeout;
        let mut queued = self.queued.lock().await;
        let mut buf = std::mem::take(&mut *queued);

        match self.read_frame(&mut buf, deadline, timeout).await {
            Ok(frame_len) => {
                let decoded = decode(&buf[..frame_len]);
                *queued = buf.split_off(frame_len);
                let packet =
                    decoded.map_err(|e| self.fail(RconError::Protocol(e)))?;
                tracing::trace!(
                    kind = %packet.kind,
                    request_id = %packet.request_id,
                    len = packet.body.len(),
                    queued = queued.len(),
                    "rcon frame decoded"
                );
                Ok(packet)
            }
            Err(RconError::Timeout(t)) => {
                *queued = buf;
                Err(RconError::Timeout(t))
            }
            Err(e) => Err(e),
        }
    }

    /// Reads the next reply and returns its text if it is a command
    /// response. Other frame kinds yield `None`.
    pub async fn read_reply(&self) -> Result<Option<String>, RconError> {
        let packet = self.read_response(REPLY_TIMEOUT).await?;
        if packet.kind == PacketKind::RESPONSE_VALUE {
            Ok(Some(packet.body_text()))
        } else {
            Ok(None)
        }
    }

    /// Closes the connection and marks the session disconnected.
    pub async fn close(&self) -> Result<(), RconError> {
        *self.lock_state() = SessionState::Disconnected {
            reason: "closed".into(),
        };
        self.conn.close().await.map_err(RconError::Io)
    }

    // -- internals --------------------------------------------------------

    /// Accumulates bytes in `buf` until it holds one whole frame and
    /// returns that frame's length (prefix included).
    async fn read_frame(
        &self,
        buf: &mut Vec<u8>,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<usize, RconError> {
        while buf.len() < LENGTH_PREFIX_SIZE {
            self.fill(buf, deadline, timeout).await?;
        }

        let declared = declared_length(buf).unwrap_or_default();
        if declared < MIN_PACKET_SIZE as i32 {
            return Err(self.fail(RconError::UnexpectedFormat(declared)));
        }
        if declared as usize > MAX_PACKET_SIZE {
            return Err(self.fail(RconError::ResponseTooLong(declared)));
        }

        let frame_len = LENGTH_PREFIX_SIZE + declared as usize;
        while buf.len() < frame_len {
            self.fill(buf, deadline, timeout).await?;
        }
        Ok(frame_len)
    }

    /// Appends one socket read to `buf`.
    async fn fill(
        &self,
        buf: &mut Vec<u8>,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<(), RconError> {
        match tokio::time::timeout_at(deadline, self.conn.recv()).await {
            Ok(Ok(Some(chunk))) => {
                buf.extend_from_slice(&chunk);
                Ok(())
            }
            Ok(Ok(None)) => Err(self.fail(RconError::ConnectionClosed)),
            Ok(Err(e)) => Err(self.fail(RconError::Io(e))),
            Err(_) => Err(RconError::Timeout(timeout)),
        }
    }

    async fn write_packet(&self, packet: &Packet) -> Result<(), RconError> {
        let bytes = encode(packet)?;
        match tokio::time::timeout(WRITE_TIMEOUT, self.conn.send(&bytes)).await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(self.fail(RconError::Io(e))),
            Err(_) => Err(self.fail(RconError::Io(TransportError::SendFailed(
                std::io::ErrorKind::TimedOut.into(),
            )))),
        }
    }

    fn next_request_id(&self) -> RequestId {
        let previous = self
            .last_id
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |id| {
                Some(RequestId(id).next().0)
            })
            .unwrap_or_else(|id| id);
        RequestId(previous).next()
    }

    fn ensure_live(&self) -> Result<(), RconError> {
        match &*self.lock_state() {
            SessionState::Disconnected { reason } => {
                Err(RconError::Disconnected(reason.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Marks the session disconnected and hands the error back.
    fn fail(&self, err: RconError) -> RconError {
        tracing::warn!(conn = %self.conn.id(), error = %err, "rcon session lost");
        *self.lock_state() = SessionState::Disconnected {
            reason: err.to_string(),
        };
        err
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
