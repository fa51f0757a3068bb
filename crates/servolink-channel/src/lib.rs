//! Byte-channel abstraction for half-duplex servo bus links.
//!
//! Provides the [`BusChannel`] contract the protocol engine drives:
//! - write of N bytes
//! - query of the available-unread-byte count
//! - read of one already-buffered byte
//! - discard of unread buffered bytes
//!
//! This is the lowest layer of servolink. Everything else builds on top of
//! the [`BusChannel`] trait provided here; [`SerialChannel`] is the UART
//! implementation used on real hardware.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{ChannelError, Result};
pub use serial::SerialChannel;
pub use traits::BusChannel;
