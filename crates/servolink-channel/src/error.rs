/// Errors that can occur on the servo bus byte channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to open the serial device.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// An I/O error occurred while reading or writing bytes.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial driver rejected a control operation (buffer query/flush).
    #[error("serial control error: {0}")]
    Serial(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
