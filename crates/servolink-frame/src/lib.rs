//! Wire frame codec for serial-bus servo packets.
//!
//! This is the pure, stateless half of servolink. Every command and reply
//! on the bus is one frame:
//! - Two 0x55 marker bytes for stream synchronization
//! - A 1-byte servo address (254 = broadcast)
//! - A 1-byte length field (payload size + 3)
//! - A 1-byte command id shared between request and reply
//! - 0-6 payload bytes, little-endian multi-byte fields
//! - A 1-byte complement checksum over address..payload
//!
//! No I/O here; the session layer in `servolink-servo` moves the bytes.

pub mod codec;
pub mod error;

pub use codec::{
    checksum, decode_and_validate, encode_frame, Frame, BROADCAST_ADDRESS, FRAME_MARKER,
    HEADER_SIZE, MAX_PAYLOAD,
};
pub use error::{FrameError, Result};
