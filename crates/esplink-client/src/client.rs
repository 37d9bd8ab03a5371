use esplink_frame::slip::{escape, unescape};
use esplink_frame::{
    check_packet, Command, FrameAssembler, FrameError, Packet, Push, RequestWriter, Summary, ESC,
};
use esplink_transport::Transport;
use tracing::{debug, trace, warn};

use crate::config::{ClientConfig, Deadline, Timeout};
use crate::error::{ClientError, Result};
use crate::sync::SyncState;

/// Receive buffer size used by [`Client::new`].
pub const DEFAULT_BUFFER_SIZE: usize = 128;

/// One end of an esplink serial link.
///
/// The client exclusively owns its transport, a fixed `N`-byte receive
/// buffer and the running CRC of the request being written. Packets returned
/// by [`try_receive`](Self::try_receive) and [`receive`](Self::receive)
/// borrow that buffer and must be dropped (or copied with
/// [`Packet::to_owned_packet`]) before the next call.
///
/// There is no internal locking. A client shared with interrupt handlers or
/// other threads must be serialized by the caller.
pub struct Client<T, const N: usize = DEFAULT_BUFFER_SIZE> {
    pub(crate) transport: T,
    assembler: FrameAssembler<N>,
    request: RequestWriter,
    pub(crate) sync_state: SyncState,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    /// Create a client with default configuration and buffer size.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    /// Create a client with explicit configuration and the default buffer size.
    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self::with_capacity(transport, config)
    }
}

impl<T: Transport, const N: usize> Client<T, N> {
    /// Create a client whose receive buffer holds `N` bytes.
    ///
    /// ```
    /// use esplink_client::{Client, ClientConfig};
    /// use esplink_transport::MemoryTransport;
    ///
    /// let client: Client<_, 64> =
    ///     Client::with_capacity(MemoryTransport::new(), ClientConfig::default());
    /// assert_eq!(client.buffer_capacity(), 64);
    /// ```
    pub fn with_capacity(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            assembler: FrameAssembler::new(),
            request: RequestWriter::new(),
            sync_state: SyncState::Idle,
            config,
        }
    }

    /// Drain every byte the transport has ready and return the first valid
    /// packet completed along the way.
    ///
    /// Never waits. Invalid frames are dropped and draining continues; a SYNC
    /// packet runs the synchronization handshake and is not returned.
    pub fn try_receive(&mut self) -> Result<Option<Packet<'_>>> {
        if self.poll_packet()? {
            Ok(Some(self.current_packet()?))
        } else {
            Ok(None)
        }
    }

    /// Poll with [`try_receive`](Self::try_receive) until a packet arrives or
    /// `timeout` is spent. `None` means nothing arrived, which is the same as
    /// an idle link.
    pub fn receive(&mut self, timeout: Timeout) -> Result<Option<Packet<'_>>> {
        let mut deadline = Deadline::start(timeout);
        while deadline.tick() {
            if self.poll_packet()? {
                return Ok(Some(self.current_packet()?));
            }
        }
        Ok(None)
    }

    /// [`receive`](Self::receive) with the configured receive timeout.
    pub fn receive_default(&mut self) -> Result<Option<Packet<'_>>> {
        self.receive(self.config.receive_timeout)
    }

    /// Read one un-escaped byte, waiting at most `timeout`.
    ///
    /// An `ESC` is merged with the byte after it; both must arrive within the
    /// same budget. Frame delimiters are returned as plain bytes.
    pub fn receive_byte(&mut self, timeout: Timeout) -> Result<Option<u8>> {
        let mut deadline = Deadline::start(timeout);
        if !self.wait_for_byte(&mut deadline) {
            return Ok(None);
        }

        let mut value = self.transport.read_byte()?;
        if value == ESC {
            if !self.wait_for_byte(&mut deadline) {
                return Ok(None);
            }
            value = unescape(self.transport.read_byte()?);
        }
        Ok(Some(value))
    }

    /// Read one un-escaped byte, retrying with the configured byte timeout
    /// until one arrives. Only a transport error ends the wait early.
    pub fn receive_byte_blocking(&mut self) -> Result<u8> {
        loop {
            if let Some(value) = self.receive_byte(self.config.byte_timeout)? {
                return Ok(value);
            }
        }
    }

    /// Discard every inbound byte that is ready, along with any partially
    /// assembled frame. Returns the number of bytes read off the transport.
    pub fn clear_input(&mut self) -> Result<usize> {
        let mut discarded = 0usize;
        while self.transport.is_byte_available() {
            self.transport.read_byte()?;
            discarded += 1;
        }
        self.assembler.reset();
        if discarded > 0 {
            trace!(discarded, "cleared inbound bytes");
        }
        Ok(discarded)
    }

    /// Open a request: delimiter, then command, argument count and value.
    pub fn send_request_header(
        &mut self,
        command: impl Into<Command>,
        value: u32,
        argc: u16,
    ) -> Result<()> {
        let command = command.into();
        debug!(command = command.id(), name = command.name(), value, argc, "sending request");
        self.request.begin(&mut self.transport, command.id(), value, argc)?;
        Ok(())
    }

    /// Append one parameter to the open request.
    pub fn add_parameter_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.request.add_parameter(&mut self.transport, data)?;
        Ok(())
    }

    /// Close the open request with its checksum and delimiter.
    pub fn finalize_request(&mut self) -> Result<()> {
        self.request.finish(&mut self.transport)?;
        Ok(())
    }

    /// Send a complete request in one call.
    pub fn send_request(
        &mut self,
        command: impl Into<Command>,
        value: u32,
        params: &[&[u8]],
    ) -> Result<()> {
        let argc = u16::try_from(params.len()).map_err(|_| ClientError::TooManyParameters {
            count: params.len(),
            max: u16::MAX as usize,
        })?;

        self.send_request_header(command, value, argc)?;
        for param in params {
            self.add_parameter_bytes(param)?;
        }
        self.finalize_request()
    }

    /// Write text through the escaping send path. No checksum, no delimiters.
    pub fn send_text(&mut self, text: &str) -> Result<()> {
        for byte in text.bytes() {
            self.transport.write_all(escape(byte).as_slice())?;
        }
        Ok(())
    }

    /// Write `value` as two lowercase hex digits and a space, unescaped.
    pub fn send_hex(&mut self, value: u8) -> Result<()> {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        self.transport.write_all(&[
            DIGITS[usize::from(value >> 4)],
            DIGITS[usize::from(value & 0x0f)],
            b' ',
        ])?;
        Ok(())
    }

    /// Write a one-line packet summary, or `Null` when there is none.
    pub fn log_packet(&mut self, packet: Option<Summary>) -> Result<()> {
        match packet {
            None => self.send_text("Null\n"),
            Some(summary) => {
                self.send_text("command: ")?;
                self.send_decimal(u32::from(summary.command))?;
                self.send_text(" value: ")?;
                self.send_decimal(summary.value)?;
                self.send_text("\n")
            }
        }
    }

    /// Current synchronization state.
    pub fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Receive buffer capacity in bytes.
    pub const fn buffer_capacity(&self) -> usize {
        N
    }

    /// Borrow the transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the client and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Feed ready bytes to the assembler until a packet for the caller is
    /// complete. True leaves that packet in the assembler.
    fn poll_packet(&mut self) -> Result<bool> {
        while self.transport.is_byte_available() {
            let byte = self.transport.read_byte()?;
            match self.assembler.push(byte) {
                Push::Incomplete | Push::Complete(0) => {}
                Push::Dropped { len } => {
                    let err = FrameError::Oversized { len, capacity: N };
                    warn!(error = %err, "dropping frame");
                    self.diagnostic("check failed\n")?;
                }
                Push::Complete(_) => {
                    if self.accept_frame()? {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }

    /// Validate the frame just completed. SYNC is handled here and never
    /// handed to the caller.
    fn accept_frame(&mut self) -> Result<bool> {
        let verdict = check_packet(self.assembler.frame()).map(|packet| packet.command());
        match verdict {
            Ok(command) => {
                self.diagnostic("got packet\n")?;
                if command == Command::Sync {
                    debug!("peer requested sync");
                    self.sync()?;
                    return Ok(false);
                }
                trace!(command = command.id(), "packet received");
                Ok(true)
            }
            Err(FrameError::TooShort { len, .. }) => {
                trace!(len, "ignoring short frame");
                Ok(false)
            }
            Err(err) => {
                debug!(error = %err, "dropping invalid frame");
                self.diagnostic("check failed\n")?;
                Ok(false)
            }
        }
    }

    /// The frame accepted by the last successful `poll_packet`.
    fn current_packet(&self) -> Result<Packet<'_>> {
        Ok(check_packet(self.assembler.frame())?)
    }

    fn wait_for_byte(&mut self, deadline: &mut Deadline) -> bool {
        loop {
            if self.transport.is_byte_available() {
                return true;
            }
            if !deadline.tick() {
                return false;
            }
        }
    }

    fn diagnostic(&mut self, text: &str) -> Result<()> {
        if self.config.wire_diagnostics {
            self.send_text(text)?;
        }
        Ok(())
    }

    fn send_decimal(&mut self, mut value: u32) -> Result<()> {
        let mut digits = [0u8; 10];
        let mut start = digits.len();
        loop {
            start -= 1;
            digits[start] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        self.transport.write_all(&digits[start..])?;
        Ok(())
    }
}

impl<T: std::fmt::Debug, const N: usize> std::fmt::Debug for Client<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("buffer_capacity", &N)
            .field("sync_state", &self.sync_state)
            .field("config", &self.config)
            .finish()
    }
}
