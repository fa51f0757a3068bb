//! Request/reply session engine and command catalogue for bus servos.
//!
//! This is the "just works" layer. [`Session`] implements the half-duplex
//! exchange discipline every command reuses: flush, send, bounded header
//! and body waits, reply validation. [`BusServo`] layers the per-command
//! catalogue on top, translating user units (degrees steps, millivolts,
//! milliseconds) into payload bytes and back.

pub mod catalog;
pub mod error;
pub mod servo;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{reply_length, CommandSpec, COMMANDS};
pub use error::{LinkError, Result};
pub use servo::{
    BusServo, DriveMode, LedAlarms, Limits, LoadMode, ModeStatus, MoveTime, PowerLed,
};
pub use session::{Session, SessionConfig, DEFAULT_REPLY_TIMEOUT};
