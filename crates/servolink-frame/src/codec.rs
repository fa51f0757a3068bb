use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame marker byte; every frame starts with two of them.
pub const FRAME_MARKER: u8 = 0x55;

/// Header: marker (2) + address (1) + length (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Maximum payload the frame format carries.
pub const MAX_PAYLOAD: usize = 6;

/// Address accepted by every servo on the bus. Write-only semantics:
/// no servo replies to a broadcast read.
pub const BROADCAST_ADDRESS: u8 = 254;

/// Bytes the length field counts beyond the payload
/// (length byte + command id + checksum).
const LENGTH_OVERHEAD: u8 = 3;

/// A decoded command or reply frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The servo this frame addresses (or was sent by).
    pub address: u8,
    /// The command id; a reply to command N carries N.
    pub command: u8,
    /// The command-specific payload, little-endian multi-byte fields.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(address: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            command,
            payload: payload.into(),
        }
    }

    /// The value of this frame's length field (payload size + 3).
    pub fn length_field(&self) -> u8 {
        self.payload.len() as u8 + LENGTH_OVERHEAD
    }

    /// The total wire size of this frame (length field + 3).
    pub fn wire_size(&self) -> usize {
        self.payload.len() + HEADER_SIZE + 2
    }
}

/// Complement checksum over the address..payload byte range.
///
/// Sum as u16 (inputs are single bytes and a frame never exceeds 8 summed
/// bytes, so the accumulator cannot overflow), bitwise NOT, low byte.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum: u16 = bytes.iter().map(|&b| u16::from(b)).sum();
    !sum as u8
}

/// Encode a frame into the wire format, appending to `dst`.
///
/// Wire format:
/// ```text
/// ┌─────────────┬─────────┬────────┬─────────┬───────────┬──────────┐
/// │ Marker (2B) │ Address │ Length │ Command │ Payload   │ Checksum │
/// │ 0x55 0x55   │ (1B)    │ (1B)   │ (1B)    │ (0-6B LE) │ (1B)     │
/// └─────────────┴─────────┴────────┴─────────┴───────────┴──────────┘
/// ```
///
/// Inputs are pre-validated bytes; only an oversized payload fails. Numeric
/// range clamping belongs to the command catalogue, not here.
pub fn encode_frame(address: u8, command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let body = dst.len() + 2;
    dst.reserve(HEADER_SIZE + 2 + payload.len());
    dst.put_u8(FRAME_MARKER);
    dst.put_u8(FRAME_MARKER);
    dst.put_u8(address);
    dst.put_u8(payload.len() as u8 + LENGTH_OVERHEAD);
    dst.put_u8(command);
    dst.put_slice(payload);
    let check = checksum(&dst[body..]);
    dst.put_u8(check);
    Ok(())
}

/// Validate a complete received frame and decode its fields.
///
/// Checks, in order: the marker pair, the length field against
/// `expected_length`, the command id against `expected_command`, and the
/// trailing checksum. Length and command are compared by exact equality:
/// a reply with the wrong size for its command id is a protocol violation
/// even when its own checksum holds, so truncated and misrouted replies are
/// rejected here rather than misread.
pub fn decode_and_validate(raw: &[u8], expected_command: u8, expected_length: u8) -> Result<Frame> {
    if raw.len() < HEADER_SIZE {
        return Err(FrameError::Truncated {
            len: raw.len(),
            need: HEADER_SIZE,
        });
    }
    if raw[0] != FRAME_MARKER || raw[1] != FRAME_MARKER {
        return Err(FrameError::BadMarker);
    }

    let length = raw[3];
    if length != expected_length {
        return Err(FrameError::LengthMismatch {
            expected: expected_length,
            actual: length,
        });
    }

    let total = usize::from(length) + 3;
    if raw.len() < total {
        return Err(FrameError::Truncated {
            len: raw.len(),
            need: total,
        });
    }

    let command = raw[4];
    if command != expected_command {
        return Err(FrameError::CommandMismatch {
            expected: expected_command,
            actual: command,
        });
    }

    let computed = checksum(&raw[2..total - 1]);
    let carried = raw[total - 1];
    if computed != carried {
        return Err(FrameError::ChecksumMismatch { computed, carried });
    }

    Ok(Frame {
        address: raw[2],
        command,
        payload: Bytes::copy_from_slice(&raw[5..total - 1]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_to_vec(address: u8, command: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(address, command, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn encode_decode_roundtrip_all_payload_sizes() {
        for size in 0..=MAX_PAYLOAD {
            let payload: Vec<u8> = (0..size as u8).map(|b| b.wrapping_mul(37)).collect();
            let wire = encode_to_vec(9, 0x1C, &payload);

            assert_eq!(wire.len(), size + 6);
            assert_eq!(wire[3], size as u8 + 3);

            let frame = decode_and_validate(&wire, 0x1C, size as u8 + 3).unwrap();
            assert_eq!(frame.address, 9);
            assert_eq!(frame.command, 0x1C);
            assert_eq!(frame.payload.as_ref(), payload.as_slice());
        }
    }

    #[test]
    fn move_time_frame_matches_documented_bytes() {
        // Position 512 for servo 5 over 1000 ms: the frame from the
        // protocol manual, checksum included.
        let position = 512u16.to_le_bytes();
        let time = 1000u16.to_le_bytes();
        let payload = [position[0], position[1], time[0], time[1]];

        let wire = encode_to_vec(5, 1, &payload);

        assert_eq!(
            wire,
            vec![0x55, 0x55, 0x05, 0x07, 0x01, 0x00, 0x02, 0xE8, 0x03, 0x05]
        );
        assert_eq!(checksum(&wire[2..9]), 0x05);
    }

    #[test]
    fn checksum_is_complement_of_byte_sum() {
        assert_eq!(checksum(&[0x05, 0x07, 0x01, 0x00, 0x02, 0xE8, 0x03]), 0x05);
        assert_eq!(checksum(&[]), 0xFF);
        assert_eq!(checksum(&[0xFF, 0xFF]), !0x1FEu16 as u8);
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let wire = encode_to_vec(5, 1, &[0x00, 0x02, 0xE8, 0x03]);

        for pos in 2..wire.len() {
            for bit in 0..8 {
                let mut corrupted = wire.clone();
                corrupted[pos] ^= 1 << bit;
                assert!(
                    decode_and_validate(&corrupted, 1, 7).is_err(),
                    "flip of bit {bit} at offset {pos} must not validate"
                );
            }
        }
    }

    #[test]
    fn checksum_consistent_corruption_is_only_caught_by_equality_checks() {
        // Corrupting a payload byte and re-deriving the checksum restores
        // the complement relationship, so only field equality can catch it.
        let mut wire = encode_to_vec(5, 2, &[0x10, 0x20]);
        wire[5] ^= 0x40;
        let end = wire.len() - 1;
        wire[end] = checksum(&wire[2..end]);

        assert!(decode_and_validate(&wire, 2, 5).is_ok());
        assert!(matches!(
            decode_and_validate(&wire, 3, 5),
            Err(FrameError::CommandMismatch { .. })
        ));
    }

    #[test]
    fn expected_length_must_match_exactly() {
        let wire = encode_to_vec(1, 28, &[0x34, 0x01]);

        for delta in [-3i16, -2, -1, 1, 2, 3] {
            let off = (5i16 + delta) as u8;
            assert!(
                matches!(
                    decode_and_validate(&wire, 28, off),
                    Err(FrameError::LengthMismatch { .. })
                ),
                "expected_length off by {delta} must fail"
            );
        }
        assert!(decode_and_validate(&wire, 28, 5).is_ok());
    }

    #[test]
    fn bad_marker_rejected_before_field_checks() {
        let mut wire = encode_to_vec(1, 26, &[0x37]);
        wire[0] = 0xAA;
        assert!(matches!(
            decode_and_validate(&wire, 26, 4),
            Err(FrameError::BadMarker)
        ));
    }

    #[test]
    fn wrong_command_id_rejected() {
        let wire = encode_to_vec(1, 26, &[0x37]);
        assert!(matches!(
            decode_and_validate(&wire, 27, 4),
            Err(FrameError::CommandMismatch {
                expected: 27,
                actual: 26
            })
        ));
    }

    #[test]
    fn truncated_input_rejected() {
        let wire = encode_to_vec(1, 2, &[0x00, 0x02, 0xE8, 0x03]);

        assert!(matches!(
            decode_and_validate(&wire[..3], 2, 7),
            Err(FrameError::Truncated { .. })
        ));
        assert!(matches!(
            decode_and_validate(&wire[..6], 2, 7),
            Err(FrameError::Truncated { .. })
        ));
    }

    #[test]
    fn oversized_payload_rejected_on_encode() {
        let mut buf = BytesMut::new();
        let err = encode_frame(1, 1, &[0u8; 7], &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 7, max: 6 }));
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_payload_frame() {
        let wire = encode_to_vec(3, 12, &[]);

        assert_eq!(wire.len(), 6);
        assert_eq!(wire[3], 3);

        let frame = decode_and_validate(&wire, 12, 3).unwrap();
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn frame_accessors() {
        let frame = Frame::new(7, 1, Bytes::from_static(&[1, 2, 3, 4]));
        assert_eq!(frame.length_field(), 7);
        assert_eq!(frame.wire_size(), 10);
    }

    #[test]
    fn encode_appends_without_clobbering() {
        let mut buf = BytesMut::new();
        encode_frame(1, 11, &[], &mut buf).unwrap();
        encode_frame(1, 12, &[], &mut buf).unwrap();

        assert_eq!(buf.len(), 12);
        assert!(decode_and_validate(&buf[..6], 11, 3).is_ok());
        assert!(decode_and_validate(&buf[6..], 12, 3).is_ok());
    }
}
