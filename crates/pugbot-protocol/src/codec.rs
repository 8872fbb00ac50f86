//! Encoding and decoding of RCON frames.
//!
//! Both directions are plain functions over byte slices. Numeric fields
//! are fixed-width little-endian `i32`s with no padding.

use crate::{Packet, PacketKind, ProtocolError, RequestId};

/// Size of the length prefix that precedes every frame.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Smallest legal declared length: id + kind + two null terminators.
pub const MIN_PACKET_SIZE: usize = 10;

/// Largest body a single frame may carry.
pub const MAX_BODY_SIZE: usize = 4096;

/// Largest legal declared length.
pub const MAX_PACKET_SIZE: usize = MAX_BODY_SIZE + MIN_PACKET_SIZE;

/// Serializes a packet into a complete frame, length prefix included.
///
/// # Errors
/// Returns [`ProtocolError::BodyTooLong`] if the body exceeds
/// [`MAX_BODY_SIZE`].
pub fn encode(packet: &Packet) -> Result<Vec<u8>, ProtocolError> {
    let body_len = packet.body.len();
    if body_len > MAX_BODY_SIZE {
        return Err(ProtocolError::BodyTooLong(body_len));
    }

    let declared = (MIN_PACKET_SIZE + body_len) as i32;
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + declared as usize);
    buf.extend_from_slice(&declared.to_le_bytes());
    buf.extend_from_slice(&packet.request_id.0.to_le_bytes());
    buf.extend_from_slice(&packet.kind.0.to_le_bytes());
    buf.extend_from_slice(&packet.body);
    buf.extend_from_slice(&[0, 0]);
    Ok(buf)
}

/// Reads the length prefix at the start of `buf`.
///
/// Returns `None` until at least [`LENGTH_PREFIX_SIZE`] bytes are present.
pub fn declared_length(buf: &[u8]) -> Option<i32> {
    let prefix: [u8; LENGTH_PREFIX_SIZE] =
        buf.get(..LENGTH_PREFIX_SIZE)?.try_into().ok()?;
    Some(i32::from_le_bytes(prefix))
}

/// Parses a frame that starts with its length prefix.
///
/// Bytes past the declared length are ignored. The body runs up to the
/// first null byte; a body cut off before its terminator is still
/// accepted as the final fragment of a reply.
///
/// # Errors
/// - [`ProtocolError::Truncated`] if the prefix or the two header fields
///   are incomplete.
/// - [`ProtocolError::UndersizedLength`] if the declared length is below
///   [`MIN_PACKET_SIZE`].
/// - [`ProtocolError::BodyTooLong`] if it exceeds [`MAX_PACKET_SIZE`].
pub fn decode(frame: &[u8]) -> Result<Packet, ProtocolError> {
    let declared = declared_length(frame).ok_or(ProtocolError::Truncated {
        needed: LENGTH_PREFIX_SIZE,
        got: frame.len(),
    })?;
    if declared < MIN_PACKET_SIZE as i32 {
        return Err(ProtocolError::UndersizedLength(declared));
    }
    let declared = declared as usize;
    if declared > MAX_PACKET_SIZE {
        return Err(ProtocolError::BodyTooLong(declared - MIN_PACKET_SIZE));
    }

    let end = frame.len().min(LENGTH_PREFIX_SIZE + declared);
    let payload = &frame[LENGTH_PREFIX_SIZE..end];
    if payload.len() < 8 {
        return Err(ProtocolError::Truncated {
            needed: LENGTH_PREFIX_SIZE + 8,
            got: frame.len(),
        });
    }

    let request_id = read_i32(&payload[0..4]);
    let kind = read_i32(&payload[4..8]);
    let rest = &payload[8..];
    let body = match rest.iter().position(|&b| b == 0) {
        Some(nul) => &rest[..nul],
        None => rest,
    };

    Ok(Packet {
        kind: PacketKind(kind),
        request_id: RequestId(request_id),
        body: body.to_vec(),
    })
}

fn read_i32(bytes: &[u8]) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    i32::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(id: i32, body: &str) -> Packet {
        Packet::new(PacketKind::EXEC, RequestId(id), body)
    }

    #[test]
    fn test_encode_produces_exact_layout() {
        let bytes = encode(&exec(1, "status")).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&16i32.to_le_bytes()); // 10 + 6
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&2i32.to_le_bytes());
        expected.extend_from_slice(b"status");
        expected.extend_from_slice(&[0, 0]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encode_declared_length_is_ten_plus_body() {
        for body in ["", "say hi", "changelevel de_inferno"] {
            let bytes = encode(&exec(5, body)).unwrap();
            assert_eq!(declared_length(&bytes), Some(10 + body.len() as i32));
            assert_eq!(bytes.len(), 4 + 10 + body.len());
        }
    }

    #[test]
    fn test_encode_rejects_oversized_body() {
        let body = vec![b'a'; MAX_BODY_SIZE + 1];
        let packet = Packet::new(PacketKind::EXEC, RequestId(1), body);
        assert_eq!(
            encode(&packet),
            Err(ProtocolError::BodyTooLong(MAX_BODY_SIZE + 1))
        );
    }

    #[test]
    fn test_encode_accepts_maximum_body() {
        let body = vec![b'a'; MAX_BODY_SIZE];
        let packet = Packet::new(PacketKind::EXEC, RequestId(1), body);
        let bytes = encode(&packet).unwrap();
        assert_eq!(declared_length(&bytes), Some(MAX_PACKET_SIZE as i32));
    }

    #[test]
    fn test_decode_round_trips_each_kind() {
        let cases = [
            Packet::new(PacketKind::AUTH, RequestId(0), "secret"),
            Packet::new(PacketKind::EXEC, RequestId(12), "mp_restartgame 1"),
            Packet::new(PacketKind::AUTH_RESPONSE, RequestId(-1), ""),
            Packet::new(PacketKind::RESPONSE_VALUE, RequestId(0x0FFF_FFFF), "hostname: pug #1"),
        ];
        for packet in cases {
            let decoded = decode(&encode(&packet).unwrap()).unwrap();
            assert_eq!(decoded, packet);
        }
    }

    #[test]
    fn test_decode_ignores_bytes_past_declared_length() {
        let mut bytes = encode(&exec(3, "log on")).unwrap();
        bytes.extend_from_slice(b"next packet starts here");
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.body, b"log on");
    }

    #[test]
    fn test_decode_accepts_body_without_terminator() {
        // A reply split by the server: the last fragment has no null.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&14i32.to_le_bytes());
        bytes.extend_from_slice(&9i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(b"tail");
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.kind, PacketKind::AUTH_RESPONSE);
        assert_eq!(decoded.request_id, RequestId(9));
        assert_eq!(decoded.body, b"tail");
    }

    #[test]
    fn test_decode_rejects_undersized_length() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&9i32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 9]);
        assert_eq!(decode(&bytes), Err(ProtocolError::UndersizedLength(9)));
    }

    #[test]
    fn test_decode_rejects_oversized_length() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(MAX_PACKET_SIZE as i32 + 1).to_le_bytes());
        bytes.extend_from_slice(&[0u8; 10]);
        assert!(matches!(decode(&bytes), Err(ProtocolError::BodyTooLong(_))));
    }

    #[test]
    fn test_decode_rejects_missing_header_fields() {
        assert!(matches!(
            decode(&[1, 0]),
            Err(ProtocolError::Truncated { needed: 4, got: 2 })
        ));

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&10i32.to_le_bytes());
        bytes.extend_from_slice(&[1, 0, 0]);
        assert!(matches!(decode(&bytes), Err(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn test_declared_length_needs_four_bytes() {
        assert_eq!(declared_length(&[10, 0, 0]), None);
        assert_eq!(declared_length(&[10, 0, 0, 0, 99]), Some(10));
    }
}
