use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Adapts a `std::io` stream (serial port, socket, pipe) to [`Transport`].
///
/// Availability is probed by reading a single byte into a one-byte lookahead.
/// For `is_byte_available` to be non-blocking the stream should be in
/// non-blocking mode or carry a short read timeout; `WouldBlock`, `TimedOut`
/// and end of file all report "nothing available". Any other read error is
/// held back and reported as available, so the following `read_byte` returns
/// it instead of the link looking idle.
///
/// Writes retry `WouldBlock` up to [`MAX_WRITE_RETRIES`] times in a row before
/// giving up with the I/O error.
#[derive(Debug)]
pub struct IoTransport<T> {
    inner: T,
    lookahead: Option<u8>,
    pending_error: Option<std::io::Error>,
}

/// Consecutive `WouldBlock` results tolerated by a single write.
pub const MAX_WRITE_RETRIES: u32 = 10_000;

impl<T: Read + Write> IoTransport<T> {
    /// Wrap a stream.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            lookahead: None,
            pending_error: None,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the adapter and return the inner stream.
    ///
    /// A byte held in the lookahead is lost.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn fill_lookahead(&mut self) -> Result<bool> {
        if self.lookahead.is_some() || self.pending_error.is_some() {
            return Ok(true);
        }

        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(false),
                Ok(_) => {
                    self.lookahead = Some(byte[0]);
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Ok(false)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T: Read + Write> Transport for IoTransport<T> {
    fn is_byte_available(&mut self) -> bool {
        match self.fill_lookahead() {
            Ok(available) => available,
            Err(TransportError::Io(err)) => {
                trace!(error = %err, "availability probe failed");
                self.pending_error = Some(err);
                true
            }
            Err(_) => false,
        }
    }

    fn read_byte(&mut self) -> Result<u8> {
        if let Some(byte) = self.lookahead.take() {
            return Ok(byte);
        }
        if let Some(err) = self.pending_error.take() {
            return Err(TransportError::Io(err));
        }

        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => return Ok(byte[0]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_all(&[byte])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        let mut blocked = 0u32;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    offset += n;
                    blocked = 0;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock && blocked < MAX_WRITE_RETRIES => {
                    blocked += 1;
                    std::hint::spin_loop();
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }
}
