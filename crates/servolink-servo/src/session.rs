use std::time::{Duration, Instant};

use bytes::{BufMut, Bytes, BytesMut};
use servolink_channel::BusChannel;
use servolink_frame::{decode_and_validate, encode_frame, HEADER_SIZE};
use tracing::trace;

use crate::error::{LinkError, Result};

/// Default bound for the header and body waits.
///
/// A reply normally starts arriving well under a millisecond after the
/// request; a few milliseconds absorbs driver buffering on non-realtime
/// hosts without making a dead servo expensive to detect.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(5);

/// Tunables for the request/reply exchange.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wall-clock bound applied independently to the header wait and the
    /// body wait. The wait itself is a busy-poll: at the latencies involved
    /// a scheduler-mediated sleep would cost more than the wait.
    pub reply_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }
}

/// A long-lived binding between one servo address and one exclusively
/// owned byte channel.
///
/// Owns no frame state across calls; every request is independent, so a
/// failed exchange never poisons the next one beyond whatever garbage was
/// left on the wire, and that is cleared by the flush opening the next
/// call. Not cloneable: the bus is half-duplex and a second writer would
/// interleave bytes into frames in flight. Callers sharing one physical
/// bus across several sessions must serialize access per bus themselves.
pub struct Session<C> {
    channel: C,
    address: u8,
    config: SessionConfig,
}

impl<C: BusChannel> Session<C> {
    /// Bind `address` to an exclusively owned channel.
    pub fn new(channel: C, address: u8) -> Self {
        Self::with_config(channel, address, SessionConfig::default())
    }

    /// Bind with explicit tunables.
    pub fn with_config(channel: C, address: u8, config: SessionConfig) -> Self {
        Self {
            channel,
            address,
            config,
        }
    }

    /// The servo address this session is bound to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Rebind to a different servo address on the same channel.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Current session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Consume the session and return the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Send a command that solicits no reply.
    ///
    /// The receive machinery is never touched, so broadcast writes are
    /// exactly as cheap as unicast ones.
    pub fn write_command(&mut self, command: u8, payload: &[u8]) -> Result<()> {
        self.send_frame(self.address, command, payload)
    }

    /// One full request/reply exchange against the bound address.
    ///
    /// Flushes stale receive bytes, sends the request, busy-waits for the
    /// 4-byte reply header and then for the announced body, validates the
    /// assembled frame against `command` and `expected_reply_length`, and
    /// returns the reply payload. Single attempt; all failures are
    /// terminal for this call.
    pub fn request(
        &mut self,
        command: u8,
        payload: &[u8],
        expected_reply_length: u8,
    ) -> Result<Bytes> {
        self.request_as(self.address, command, payload, expected_reply_length)
    }

    /// A request/reply exchange under an explicit address.
    ///
    /// Exists for address-agnostic exchanges: id discovery is issued to the
    /// broadcast address regardless of what this session is bound to.
    pub fn request_as(
        &mut self,
        address: u8,
        command: u8,
        payload: &[u8],
        expected_reply_length: u8,
    ) -> Result<Bytes> {
        // Stale bytes from a timed-out or partially drained prior reply
        // would desynchronize this exchange.
        self.channel.discard_input()?;
        self.send_frame(address, command, payload)?;

        if !self.wait_available(HEADER_SIZE)? {
            trace!(command, "header wait expired");
            return Err(LinkError::HeaderTimeout {
                timeout: self.config.reply_timeout,
            });
        }

        let mut raw = BytesMut::with_capacity(HEADER_SIZE + usize::from(expected_reply_length));
        for _ in 0..HEADER_SIZE {
            raw.put_u8(self.channel.read_byte()?);
        }

        let announced = raw[3];
        // The length field counts itself; command id, payload and checksum
        // are the length - 1 bytes still on the wire.
        let body = usize::from(announced).saturating_sub(1);
        if !self.wait_available(body)? {
            trace!(command, announced, "body wait expired");
            return Err(LinkError::BodyTimeout {
                timeout: self.config.reply_timeout,
                announced,
            });
        }
        for _ in 0..body {
            raw.put_u8(self.channel.read_byte()?);
        }

        let frame = decode_and_validate(&raw, command, expected_reply_length)?;
        trace!(
            command,
            payload_len = frame.payload.len(),
            "exchange complete"
        );
        Ok(frame.payload)
    }

    fn send_frame(&mut self, address: u8, command: u8, payload: &[u8]) -> Result<()> {
        let mut wire = BytesMut::with_capacity(HEADER_SIZE + 2 + payload.len());
        encode_frame(address, command, payload, &mut wire)?;
        trace!(address, command, len = wire.len(), "sending frame");
        self.channel.send(&wire)?;
        Ok(())
    }

    /// Busy-poll the channel until `count` bytes are buffered or the
    /// configured bound passes. Returns whether the bytes arrived.
    fn wait_available(&mut self, count: usize) -> Result<bool> {
        let deadline = Instant::now() + self.config.reply_timeout;
        loop {
            if self.channel.available()? >= count {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::hint::spin_loop();
        }
    }
}

impl<C> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("reply_timeout", &self.config.reply_timeout)
            .finish()
    }
}
