//! Scripted channel stub shared by the session and servo test modules.

use std::collections::VecDeque;

use servolink_channel::{BusChannel, Result};

/// A channel that buffers everything written and plays back a scripted
/// reply once a request has been sent. Counters expose which parts of the
/// contract an exchange exercised.
pub struct ScriptedChannel {
    /// The reply delivered after the next send; `None` keeps the line silent.
    script: Option<Vec<u8>>,
    rx: VecDeque<u8>,
    pub sent: Vec<u8>,
    pub discards: usize,
    pub reads: usize,
    pub available_calls: usize,
}

impl ScriptedChannel {
    pub fn silent() -> Self {
        Self {
            script: None,
            rx: VecDeque::new(),
            sent: Vec::new(),
            discards: 0,
            reads: 0,
            available_calls: 0,
        }
    }

    pub fn with_reply(reply: Vec<u8>) -> Self {
        Self {
            script: Some(reply),
            ..Self::silent()
        }
    }

    /// Preload bytes into the receive buffer, as if left over from an
    /// earlier exchange.
    pub fn buffer_input(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }
}

impl BusChannel for ScriptedChannel {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.sent.extend_from_slice(bytes);
        if let Some(reply) = self.script.take() {
            self.rx.extend(reply);
        }
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        self.available_calls += 1;
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.reads += 1;
        self.rx.pop_front().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::WouldBlock, "no byte buffered").into()
        })
    }

    fn discard_input(&mut self) -> Result<()> {
        self.discards += 1;
        self.rx.clear();
        Ok(())
    }
}
