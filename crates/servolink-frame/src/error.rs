/// Errors that can occur during frame encoding/validation.
///
/// Every decode-side variant means the reply cannot belong to the exchange
/// that solicited it; the session layer surfaces them all as a corrupt reply.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame does not start with the 0x55 0x55 marker pair.
    #[error("bad frame marker (expected 0x55 0x55)")]
    BadMarker,

    /// The frame's length field differs from the length the command expects.
    #[error("reply length {actual} does not match expected {expected}")]
    LengthMismatch { expected: u8, actual: u8 },

    /// The reply carries a different command id than the request.
    #[error("reply command {actual:#04x} does not match expected {expected:#04x}")]
    CommandMismatch { expected: u8, actual: u8 },

    /// The trailing checksum byte does not match the computed value.
    #[error("checksum mismatch (computed {computed:#04x}, frame carries {carried:#04x})")]
    ChecksumMismatch { computed: u8, carried: u8 },

    /// The payload exceeds the 6-byte maximum the frame format allows.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Fewer bytes than a complete frame of the announced size.
    #[error("frame truncated ({len} bytes, need {need})")]
    Truncated { len: usize, need: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
