//! Serial-bus servo control over half-duplex UART.
//!
//! servolink drives a class of addressable bus servos through a
//! request/reply frame protocol: checksummed command frames out, validated
//! reply frames back, one exchange at a time on an exclusively owned
//! serial channel.
//!
//! # Crate Structure
//!
//! - [`channel`] — Byte-channel abstraction and the UART implementation
//! - [`frame`] — Pure wire frame codec (markers, length, checksum)
//! - [`servo`] — Request/reply session engine and the typed command catalogue

/// Re-export channel types.
pub mod channel {
    pub use servolink_channel::*;
}

/// Re-export frame codec types.
pub mod frame {
    pub use servolink_frame::*;
}

/// Re-export session and command catalogue types.
pub mod servo {
    pub use servolink_servo::*;
}
