use tracing::trace;

use crate::slip::{Decoded, SlipDecoder};

/// Outcome of feeding one wire byte to a [`FrameAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    /// The frame is still being assembled.
    Incomplete,
    /// A delimiter closed a frame of this many bytes; see
    /// [`FrameAssembler::frame`].
    Complete(usize),
    /// A delimiter closed a frame that did not fit the buffer. Its bytes are
    /// gone; `len` counts every body byte received.
    Dropped { len: usize },
}

/// Collects de-escaped bytes into a fixed-size buffer until a delimiter.
///
/// Oversized frames are dropped whole: once the buffer is full the rest of
/// the frame is counted but not stored, and the delimiter reports
/// [`Push::Dropped`] instead of handing out a truncated frame.
#[derive(Debug, Clone)]
pub struct FrameAssembler<const N: usize> {
    buffer: [u8; N],
    index: usize,
    overflow: usize,
    completed: usize,
    decoder: SlipDecoder,
}

impl<const N: usize> Default for FrameAssembler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameAssembler<N> {
    /// Create an empty assembler.
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            index: 0,
            overflow: 0,
            completed: 0,
            decoder: SlipDecoder::new(),
        }
    }

    /// Buffer capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes stored for the frame in progress.
    pub fn len(&self) -> usize {
        self.index
    }

    /// True when no bytes of a new frame have arrived.
    pub fn is_empty(&self) -> bool {
        self.index == 0 && self.overflow == 0
    }

    /// Feed one wire byte.
    pub fn push(&mut self, byte: u8) -> Push {
        match self.decoder.decode(byte) {
            Decoded::Pending => Push::Incomplete,
            Decoded::Byte(value) => {
                if self.index < N {
                    self.buffer[self.index] = value;
                    self.index += 1;
                } else {
                    self.overflow += 1;
                }
                Push::Incomplete
            }
            Decoded::End => {
                let len = self.index;
                let overflow = self.overflow;
                self.index = 0;
                self.overflow = 0;

                if overflow > 0 {
                    self.completed = 0;
                    trace!(len = len + overflow, capacity = N, "dropping oversized frame");
                    Push::Dropped {
                        len: len + overflow,
                    }
                } else {
                    self.completed = len;
                    Push::Complete(len)
                }
            }
        }
    }

    /// The most recently completed frame.
    ///
    /// Valid until the next call to [`push`](Self::push) overwrites it.
    pub fn frame(&self) -> &[u8] {
        &self.buffer[..self.completed]
    }

    /// Discard the frame in progress and any pending escape.
    pub fn reset(&mut self) {
        self.index = 0;
        self.overflow = 0;
        self.decoder.reset();
    }
}
