use std::io::{Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info};

use crate::error::{ChannelError, Result};
use crate::traits::BusChannel;

/// Safety net for the single-byte read; the engine only reads bytes whose
/// arrival was already confirmed via [`BusChannel::available`].
const PORT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// UART channel over a host serial device.
///
/// Owns the port exclusively for the life of the value. 8N1 framing at the
/// requested baud rate, which is what the servo bus speaks.
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialChannel {
    /// Bus bit rate used by the servo firmware.
    pub const DEFAULT_BAUD: u32 = 115_200;

    /// Open the serial device at `path` with the default bus baud rate.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_baud(path, Self::DEFAULT_BAUD)
    }

    /// Open the serial device at `path` with an explicit baud rate.
    pub fn open_with_baud(path: &str, baud: u32) -> Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(PORT_READ_TIMEOUT)
            .open()
            .map_err(|source| ChannelError::Open {
                port: path.to_string(),
                source,
            })?;

        info!(path, baud, "opened serial channel");

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// The device path this channel is bound to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Channel name for diagnostics.
    pub fn channel_name(&self) -> &'static str {
        "serial-uart"
    }
}

impl BusChannel for SerialChannel {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn discard_input(&mut self) -> Result<()> {
        debug!(path = %self.path, "discarding buffered input");
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("path", &self.path)
            .finish()
    }
}
