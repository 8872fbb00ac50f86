//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the bytes themselves are wrong. Socket
//! failures live in the transport and session layers.

/// Errors that can occur while encoding or decoding an RCON frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The declared length is below the fixed 10-byte header.
    #[error("declared packet length {0} is below the 10-byte minimum")]
    UndersizedLength(i32),

    /// The body (or declared length) exceeds what a single frame may carry.
    #[error("packet body of {0} bytes exceeds the 4096-byte maximum")]
    BodyTooLong(usize),

    /// Fewer bytes were supplied than the fixed header needs.
    #[error("frame truncated: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
}
