//! Core types carried by an RCON frame.

use std::fmt;

// ---------------------------------------------------------------------------
// PacketKind
// ---------------------------------------------------------------------------

/// The `type` field of a frame.
///
/// This is a newtype over the raw wire code rather than an enum because
/// the protocol reuses code `2` for two meanings: a command sent to the
/// server (`EXEC`) and the server's reply to it (`RESPONSE_VALUE`). Which
/// one a frame is depends on the direction it travels, so both constants
/// compare equal and unknown codes survive a decode untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketKind(pub i32);

impl PacketKind {
    /// Client → server: log in with the RCON password.
    pub const AUTH: Self = Self(3);
    /// Client → server: run a console command.
    pub const EXEC: Self = Self(2);
    /// Server → client: result of an `AUTH` request.
    pub const AUTH_RESPONSE: Self = Self(0);
    /// Server → client: output of a command.
    pub const RESPONSE_VALUE: Self = Self(2);
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            3 => write!(f, "AUTH"),
            2 => write!(f, "EXEC/RESPONSE_VALUE"),
            0 => write!(f, "AUTH_RESPONSE"),
            other => write!(f, "UNKNOWN({other})"),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// Correlates a request with the server's reply.
///
/// Ids live in a 28-bit space. A session starts at [`RequestId::MAX`] so
/// that the first id it hands out is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub i32);

impl RequestId {
    /// Largest id in the 28-bit space.
    pub const MAX: Self = Self(0x0FFF_FFFF);

    /// Returns the id after this one, wrapping to `0` once the 28-bit
    /// space is exhausted. Values outside the space (negative ids, such
    /// as the `-1` a server sends on a bad password) also reseed to `0`.
    pub fn next(self) -> Self {
        if self.0 & Self::MAX.0 != self.0 || self == Self::MAX {
            Self(0)
        } else {
            Self(self.0 + 1)
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// One decoded RCON frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// What the frame is (auth, command, reply).
    pub kind: PacketKind,
    /// The id the reply will echo back.
    pub request_id: RequestId,
    /// Raw body bytes, without the trailing null terminators.
    pub body: Vec<u8>,
}

impl Packet {
    /// Builds a packet with a text body.
    pub fn new(
        kind: PacketKind,
        request_id: RequestId,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            kind,
            request_id,
            body: body.into(),
        }
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_and_response_value_share_a_code() {
        assert_eq!(PacketKind::EXEC, PacketKind::RESPONSE_VALUE);
        assert_ne!(PacketKind::AUTH, PacketKind::AUTH_RESPONSE);
    }

    #[test]
    fn test_packet_kind_display() {
        assert_eq!(PacketKind::AUTH.to_string(), "AUTH");
        assert_eq!(PacketKind::AUTH_RESPONSE.to_string(), "AUTH_RESPONSE");
        assert_eq!(PacketKind(9).to_string(), "UNKNOWN(9)");
    }

    #[test]
    fn test_request_id_next_increments() {
        assert_eq!(RequestId(0).next(), RequestId(1));
        assert_eq!(RequestId(41).next(), RequestId(42));
    }

    #[test]
    fn test_request_id_next_wraps_from_max_to_zero() {
        assert_eq!(RequestId::MAX.next(), RequestId(0));
    }

    #[test]
    fn test_request_id_next_reseeds_out_of_range_values() {
        assert_eq!(RequestId(-1).next(), RequestId(0));
        assert_eq!(RequestId(0x7FFF_FFFF).next(), RequestId(0));
        assert_eq!(RequestId(0x1000_0000).next(), RequestId(0));
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId(7).to_string(), "#7");
    }

    #[test]
    fn test_packet_body_text_is_lossy() {
        let p = Packet::new(PacketKind::RESPONSE_VALUE, RequestId(1), vec![b'o', b'k', 0xFF]);
        assert_eq!(p.body_text(), "ok\u{FFFD}");
    }
}
