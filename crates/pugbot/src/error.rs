//! Unified error type for pugbot.

use pugbot_match::{MatchError, PugError};
use pugbot_protocol::ProtocolError;
use pugbot_rcon::RconError;
use pugbot_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts errors from any layer.
#[derive(Debug, thiserror::Error)]
pub enum PugbotError {
    /// A socket error (connect, bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A malformed RCON frame.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An RCON session error (auth, framing, disconnect).
    #[error(transparent)]
    Rcon(#[from] RconError),

    /// A rejected PUG operation.
    #[error(transparent)]
    Pug(#[from] PugError),

    /// A rejected match command.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// The configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl PugbotError {
    /// Returns `true` for errors meant for the player who caused them.
    /// Everything else is for the operator's log.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Pug(_) | Self::Match(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let pugbot_err: PugbotError = err.into();
        assert!(matches!(pugbot_err, PugbotError::Transport(_)));
        assert!(pugbot_err.to_string().contains("gone"));
        assert!(!pugbot_err.is_user_facing());
    }

    #[test]
    fn test_from_rcon_error() {
        let pugbot_err: PugbotError = RconError::AuthFailed.into();
        assert!(matches!(pugbot_err, PugbotError::Rcon(_)));
    }

    #[test]
    fn test_from_pug_error_is_user_facing() {
        let pugbot_err: PugbotError = PugError::PugFull.into();
        assert!(pugbot_err.is_user_facing());
        assert_eq!(pugbot_err.to_string(), PugError::PugFull.to_string());
    }

    #[test]
    fn test_from_match_error_is_user_facing() {
        let pugbot_err: PugbotError = MatchError::GoneLive.into();
        assert!(matches!(pugbot_err, PugbotError::Match(_)));
        assert!(pugbot_err.is_user_facing());
    }
}
