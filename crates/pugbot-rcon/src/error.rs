//! Error types for the RCON session layer.

use std::time::Duration;

use pugbot_protocol::{PacketKind, ProtocolError};
use pugbot_transport::TransportError;

/// Errors that can occur while talking to a game server over RCON.
///
/// Framing and socket errors end the session: it is marked disconnected
/// and every later call fails with [`RconError::Disconnected`]. Whoever
/// provisioned the session decides whether to open a new one.
#[derive(Debug, thiserror::Error)]
pub enum RconError {
    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The underlying socket failed.
    #[error(transparent)]
    Io(#[from] TransportError),

    /// The server answered the auth request with a different id, which
    /// is how it reports a wrong password.
    #[error("rcon: authentication failed")]
    AuthFailed,

    /// The server answered the auth request with something other than
    /// an auth response.
    #[error("rcon: invalid response type {0} during auth")]
    InvalidAuthResponse(PacketKind),

    /// A reply declared a length below the fixed header size.
    #[error("rcon: unexpected response format (declared length {0})")]
    UnexpectedFormat(i32),

    /// A reply declared a length above the maximum frame size.
    #[error("rcon: response too long (declared length {0})")]
    ResponseTooLong(i32),

    /// No complete reply arrived in time. Bytes received so far are kept
    /// for the next read, so the session stays usable.
    #[error("rcon: no response within {0:?}")]
    Timeout(Duration),

    /// The server closed the connection.
    #[error("rcon: connection closed by server")]
    ConnectionClosed,

    /// A command was issued before the password handshake succeeded.
    #[error("rcon: session is not authenticated")]
    NotAuthenticated,

    /// The session already failed and no longer talks to the server.
    #[error("rcon: session disconnected ({0})")]
    Disconnected(String),
}

impl RconError {
    /// Returns `true` if this error ended the session.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::AuthFailed
                | Self::InvalidAuthResponse(_)
                | Self::Timeout(_)
                | Self::NotAuthenticated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_not_fatal() {
        assert!(!RconError::Timeout(Duration::from_secs(1)).is_fatal());
        assert!(!RconError::AuthFailed.is_fatal());
    }

    #[test]
    fn test_framing_and_io_errors_are_fatal() {
        assert!(RconError::UnexpectedFormat(3).is_fatal());
        assert!(RconError::ResponseTooLong(9000).is_fatal());
        assert!(RconError::ConnectionClosed.is_fatal());
        assert!(
            RconError::Io(TransportError::ConnectionClosed("reset".into()))
                .is_fatal()
        );
    }

    #[test]
    fn test_from_protocol_error() {
        let err: RconError = ProtocolError::UndersizedLength(2).into();
        assert!(matches!(err, RconError::Protocol(_)));
        assert!(err.to_string().contains("minimum"));
    }
}
