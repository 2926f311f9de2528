//! Binary codec for encoding and decoding RCON packets.
//!
//! Wire format:
//! ```text
//! [size:4][id:4][type:4][body:N][0x00][0x00]
//! ```
//! All integers are little-endian.  `size` counts only the bytes after the
//! size field: `4 + 4 + N + 2`.  A declared size outside `[10, 4096]` marks
//! the frame as corrupt and must be rejected before any allocation happens.

use crate::protocol::packet::{Packet, MAX_PACKET_SIZE, MIN_PACKET_SIZE};
use thiserror::Error;

/// Errors that can occur during packet encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    /// The byte slice is shorter than the frame it declares.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The declared size field is outside the legal `[10, 4096]` range.
    #[error("declared packet size {0} outside [{MIN_PACKET_SIZE}, {MAX_PACKET_SIZE}]")]
    SizeOutOfBounds(i32),

    /// One of the two trailer bytes after the body is not NUL.
    #[error("packet trailer malformed: expected two NUL bytes after body")]
    TrailerMalformed,

    /// The body is not valid UTF-8.
    #[error("packet body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The body contains an embedded NUL byte, which the wire format cannot
    /// represent (NUL terminates the body).
    #[error("packet body contains an embedded NUL byte")]
    EmbeddedNul,

    /// The body is too large for the 4096-byte packet size ceiling.
    #[error("packet body of {0} bytes exceeds the {MAX_PACKET_SIZE}-byte frame limit")]
    BodyTooLarge(usize),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`Packet`] into a byte vector including the 4-byte size prefix.
///
/// # Errors
///
/// Returns [`CodecError::EmbeddedNul`] if the body contains a NUL byte and
/// [`CodecError::BodyTooLarge`] if the framed packet would exceed the size
/// ceiling.
///
/// # Examples
///
/// ```rust
/// use craftcon_core::protocol::{decode_packet, encode_packet, Packet};
///
/// let packet = Packet::exec(42, "list");
/// let bytes = encode_packet(&packet).unwrap();
/// let (decoded, consumed) = decode_packet(&bytes).unwrap();
/// assert_eq!(decoded, packet);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_packet(packet: &Packet) -> Result<Vec<u8>, CodecError> {
    let body = packet.body.as_bytes();
    if body.contains(&0) {
        return Err(CodecError::EmbeddedNul);
    }

    let size = packet.wire_size();
    if size as i32 > MAX_PACKET_SIZE {
        return Err(CodecError::BodyTooLarge(body.len()));
    }

    let mut buf = Vec::with_capacity(4 + size);
    buf.extend_from_slice(&(size as i32).to_le_bytes());
    buf.extend_from_slice(&packet.id.to_le_bytes());
    buf.extend_from_slice(&packet.kind.to_le_bytes());
    buf.extend_from_slice(body);
    buf.push(0x00); // body terminator
    buf.push(0x00); // padding
    Ok(buf)
}

/// Decodes one [`Packet`] from the beginning of `bytes`.
///
/// Returns the decoded packet and the total number of bytes consumed
/// (size prefix + frame), so the caller can advance their read cursor.
///
/// The two trailer bytes are part of the declared size and are consumed and
/// checked here – body length is always `size − 8 − 2`.
///
/// # Errors
///
/// Returns [`CodecError`] if the bytes are truncated, the declared size is
/// out of bounds, the trailer is malformed, or the body is not UTF-8.
pub fn decode_packet(bytes: &[u8]) -> Result<(Packet, usize), CodecError> {
    if bytes.len() < 4 {
        return Err(CodecError::InsufficientData {
            needed: 4,
            available: bytes.len(),
        });
    }

    let declared = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&declared) {
        return Err(CodecError::SizeOutOfBounds(declared));
    }

    let total = 4 + declared as usize;
    if bytes.len() < total {
        return Err(CodecError::InsufficientData {
            needed: total,
            available: bytes.len(),
        });
    }

    let id = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let kind = i32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);

    let body_len = declared as usize - 8 - 2;
    let body_end = 12 + body_len;
    if bytes[body_end] != 0 || bytes[body_end + 1] != 0 {
        return Err(CodecError::TrailerMalformed);
    }

    let body = String::from_utf8(bytes[12..body_end].to_vec())?;
    Ok((Packet { id, kind, body }, total))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet::{SERVERDATA_AUTH, SERVERDATA_EXECCOMMAND};

    fn round_trip(packet: &Packet) -> Packet {
        let encoded = encode_packet(packet).expect("encode failed");
        let (decoded, consumed) = decode_packet(&encoded).expect("decode failed");
        assert_eq!(
            consumed,
            encoded.len(),
            "consumed bytes should equal total encoded size"
        );
        decoded
    }

    // ── Round trips ───────────────────────────────────────────────────────────

    #[test]
    fn test_exec_packet_round_trip() {
        let packet = Packet::exec(0x1234_5678, "whitelist add Steve");
        assert_eq!(round_trip(&packet), packet);
    }

    #[test]
    fn test_auth_packet_round_trip() {
        let packet = Packet::auth(1, "s3cret");
        assert_eq!(round_trip(&packet), packet);
    }

    #[test]
    fn test_empty_body_round_trip() {
        let packet = Packet::new(9, SERVERDATA_AUTH, "");
        assert_eq!(round_trip(&packet), packet);
    }

    #[test]
    fn test_negative_id_round_trip() {
        // Servers use id -1 as the auth-failure sentinel; the codec itself
        // must carry it unchanged.
        let packet = Packet::new(-1, SERVERDATA_EXECCOMMAND, "");
        assert_eq!(round_trip(&packet), packet);
    }

    #[test]
    fn test_non_ascii_body_round_trip() {
        let packet = Packet::exec(5, "say grüße, world – ☺");
        assert_eq!(round_trip(&packet), packet);
    }

    #[test]
    fn test_maximum_body_round_trip() {
        // 4096 − 10 = 4086 bytes of body is the largest legal payload.
        let packet = Packet::exec(1, "a".repeat(4086));
        assert_eq!(round_trip(&packet), packet);
    }

    // ── Encoded layout ────────────────────────────────────────────────────────

    #[test]
    fn test_encoded_layout_is_little_endian() {
        let bytes = encode_packet(&Packet::new(0x0102_0304, SERVERDATA_AUTH, "ab")).unwrap();
        // size = 4 + 4 + 2 + 2 = 12
        assert_eq!(&bytes[0..4], &12i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[8..12], &3i32.to_le_bytes());
        assert_eq!(&bytes[12..14], b"ab");
        assert_eq!(&bytes[14..16], &[0x00, 0x00]);
    }

    #[test]
    fn test_encode_rejects_embedded_nul() {
        let result = encode_packet(&Packet::exec(1, "bad\0body"));
        assert_eq!(result, Err(CodecError::EmbeddedNul));
    }

    #[test]
    fn test_encode_rejects_oversized_body() {
        let result = encode_packet(&Packet::exec(1, "a".repeat(4087)));
        assert_eq!(result, Err(CodecError::BodyTooLarge(4087)));
    }

    // ── Decode error paths ────────────────────────────────────────────────────

    #[test]
    fn test_decode_empty_bytes_returns_insufficient_data() {
        let result = decode_packet(&[]);
        assert!(matches!(result, Err(CodecError::InsufficientData { .. })));
    }

    #[test]
    fn test_decode_truncated_size_field_returns_insufficient_data() {
        let result = decode_packet(&[0x0A, 0x00]);
        assert!(matches!(result, Err(CodecError::InsufficientData { .. })));
    }

    #[test]
    fn test_decode_rejects_size_below_minimum() {
        let mut bytes = vec![0u8; 16];
        bytes[0..4].copy_from_slice(&9i32.to_le_bytes());
        assert_eq!(decode_packet(&bytes), Err(CodecError::SizeOutOfBounds(9)));
    }

    #[test]
    fn test_decode_rejects_size_above_maximum() {
        let mut bytes = vec![0u8; 16];
        bytes[0..4].copy_from_slice(&4097i32.to_le_bytes());
        assert_eq!(
            decode_packet(&bytes),
            Err(CodecError::SizeOutOfBounds(4097))
        );
    }

    #[test]
    fn test_decode_rejects_negative_size() {
        let mut bytes = vec![0u8; 16];
        bytes[0..4].copy_from_slice(&(-1i32).to_le_bytes());
        assert_eq!(decode_packet(&bytes), Err(CodecError::SizeOutOfBounds(-1)));
    }

    #[test]
    fn test_decode_truncated_frame_returns_insufficient_data() {
        // Declares 20 bytes of frame but only 10 follow the size field.
        let mut bytes = vec![0u8; 14];
        bytes[0..4].copy_from_slice(&20i32.to_le_bytes());
        assert_eq!(
            decode_packet(&bytes),
            Err(CodecError::InsufficientData {
                needed: 24,
                available: 14,
            })
        );
    }

    #[test]
    fn test_decode_rejects_nonzero_trailer() {
        let mut bytes = encode_packet(&Packet::exec(1, "list")).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 0xFF;
        assert_eq!(decode_packet(&bytes), Err(CodecError::TrailerMalformed));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8_body() {
        let mut bytes = encode_packet(&Packet::exec(1, "ab")).unwrap();
        bytes[12] = 0xFF; // not a valid UTF-8 start byte
        assert!(matches!(
            decode_packet(&bytes),
            Err(CodecError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_decode_ignores_bytes_after_the_frame() {
        // A second frame queued behind the first must not confuse the decoder.
        let mut bytes = encode_packet(&Packet::exec(3, "tps")).unwrap();
        let first_len = bytes.len();
        bytes.extend_from_slice(&encode_packet(&Packet::exec(4, "version")).unwrap());

        let (packet, consumed) = decode_packet(&bytes).unwrap();
        assert_eq!(packet.id, 3);
        assert_eq!(packet.body, "tps");
        assert_eq!(consumed, first_len);
    }
}
