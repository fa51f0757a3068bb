use crate::error::Result;

/// A duplex byte channel to the servo bus.
///
/// The protocol engine assumes a fixed bit rate high enough that a
/// single-byte read does not block once availability has been confirmed.
/// Implementations own the underlying device exclusively: the bus is
/// half-duplex, and interleaved writers would corrupt every frame in
/// flight, so a channel value is never cloneable or shareable.
pub trait BusChannel {
    /// Write all bytes to the bus.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Number of received bytes buffered and not yet read.
    fn available(&mut self) -> Result<usize>;

    /// Read one buffered byte.
    ///
    /// Callers must confirm availability first; reading with nothing
    /// buffered is an error.
    fn read_byte(&mut self) -> Result<u8>;

    /// Drop any buffered unread bytes.
    ///
    /// Used to resynchronize before a new exchange after a timed-out or
    /// partially drained reply.
    fn discard_input(&mut self) -> Result<()>;
}
