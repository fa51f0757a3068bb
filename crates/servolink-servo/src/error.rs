use std::time::Duration;

use servolink_channel::ChannelError;
use servolink_frame::FrameError;

/// Errors that can occur during a request/reply exchange.
///
/// Every failure is terminal for that single call; the engine never retries
/// internally. Idempotent reads are safe to retry blindly, id assignment is
/// not, so retry policy stays with the caller.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Channel-level failure (device setup or byte I/O), surfaced unchanged.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// No reply header observed within the polling bound. Likely servo
    /// absent, wrong address, or bus noise.
    #[error("no reply header within {timeout:?}")]
    HeaderTimeout { timeout: Duration },

    /// Header observed but the body never completed within the polling
    /// bound. Likely a truncated transmission.
    #[error("reply body incomplete within {timeout:?} (announced length {announced})")]
    BodyTimeout { timeout: Duration, announced: u8 },

    /// Length, command id, or checksum mismatch. Likely bus noise or a
    /// reply belonging to a different in-flight exchange.
    #[error("corrupt reply: {0}")]
    CorruptReply(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, LinkError>;
