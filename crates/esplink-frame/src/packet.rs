use bytes::Bytes;
use tracing::trace;

use crate::command::Command;
use crate::crc::crc16;
use crate::error::{FrameError, Result};
use crate::request::padding_for;

/// Header: command (2) + argument count (2) + value (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Trailing checksum size.
pub const CRC_SIZE: usize = 2;

/// Frames shorter than this are rejected before the checksum is computed.
pub const MIN_FRAME_SIZE: usize = 8;

/// Validate a de-escaped frame and return a view over it.
///
/// The checksum covers every byte except the last two, which carry the
/// expected CRC16 little-endian.
pub fn check_packet(frame: &[u8]) -> Result<Packet<'_>> {
    if frame.len() < MIN_FRAME_SIZE {
        return Err(FrameError::TooShort {
            len: frame.len(),
            min: MIN_FRAME_SIZE,
        });
    }

    let (body, trailer) = frame.split_at(frame.len() - CRC_SIZE);
    let received = u16::from_le_bytes([trailer[0], trailer[1]]);
    let computed = crc16(body);
    if received != computed {
        return Err(FrameError::ChecksumMismatch { received, computed });
    }

    trace!(len = frame.len(), crc = computed, "frame validated");
    Ok(Packet { frame })
}

/// A validated packet, borrowed from the buffer it was received into.
///
/// Header fields are read at fixed offsets from the start of the frame. A
/// frame of 8 or 9 bytes is accepted, in which case `value` overlaps the
/// checksum bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    frame: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Wrap a frame that already passed [`check_packet`].
    pub(crate) fn from_validated(frame: &'a [u8]) -> Self {
        debug_assert!(frame.len() >= MIN_FRAME_SIZE);
        Self { frame }
    }

    /// Command identifier.
    pub fn command(&self) -> Command {
        Command::from(self.command_id())
    }

    /// Raw command identifier.
    pub fn command_id(&self) -> u16 {
        u16::from_le_bytes([self.frame[0], self.frame[1]])
    }

    /// Argument count announced by the sender.
    pub fn argc(&self) -> u16 {
        u16::from_le_bytes([self.frame[2], self.frame[3]])
    }

    /// The 32-bit value field.
    pub fn value(&self) -> u32 {
        u32::from_le_bytes([self.frame[4], self.frame[5], self.frame[6], self.frame[7]])
    }

    /// Trailing checksum.
    pub fn crc(&self) -> u16 {
        let len = self.frame.len();
        u16::from_le_bytes([self.frame[len - 2], self.frame[len - 1]])
    }

    /// Raw argument area between the header and the checksum.
    pub fn payload(&self) -> &'a [u8] {
        let end = self.frame.len() - CRC_SIZE;
        if end > HEADER_SIZE {
            &self.frame[HEADER_SIZE..end]
        } else {
            &[]
        }
    }

    /// Length-prefixed arguments in the payload.
    pub fn arguments(&self) -> Arguments<'a> {
        Arguments {
            rest: self.payload(),
            failed: false,
        }
    }

    /// The whole frame including header and checksum.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.frame
    }

    /// Command and value, detached from the buffer.
    pub fn summary(&self) -> Summary {
        Summary {
            command: self.command_id(),
            value: self.value(),
        }
    }

    /// Copy the frame out of the receive buffer.
    pub fn to_owned_packet(&self) -> OwnedPacket {
        OwnedPacket {
            frame: Bytes::copy_from_slice(self.frame),
        }
    }
}

impl std::fmt::Debug for Packet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("command", &self.command())
            .field("argc", &self.argc())
            .field("value", &self.value())
            .field("payload_len", &self.payload().len())
            .field("crc", &format_args!("{:#06x}", self.crc()))
            .finish()
    }
}

/// The two header fields shown in packet logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub command: u16,
    pub value: u32,
}

/// Iterator over `(len: u16, bytes, zero padding to 4)` arguments.
///
/// A length prefix that runs past the payload yields one
/// [`FrameError::TruncatedArgument`] and ends the iteration. Missing padding
/// after the final argument is tolerated.
#[derive(Debug, Clone)]
pub struct Arguments<'a> {
    rest: &'a [u8],
    failed: bool,
}

impl<'a> Iterator for Arguments<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.rest.is_empty() {
            return None;
        }

        if self.rest.len() < 2 {
            self.failed = true;
            return Some(Err(FrameError::TruncatedArgument {
                needed: 2,
                available: self.rest.len(),
            }));
        }

        let len = u16::from_le_bytes([self.rest[0], self.rest[1]]) as usize;
        let data = &self.rest[2..];
        if data.len() < len {
            self.failed = true;
            return Some(Err(FrameError::TruncatedArgument {
                needed: len,
                available: data.len(),
            }));
        }

        let (arg, tail) = data.split_at(len);
        let pad = padding_for(len).min(tail.len());
        self.rest = &tail[pad..];
        Some(Ok(arg))
    }
}

/// A validated packet detached from the receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPacket {
    frame: Bytes,
}

impl OwnedPacket {
    /// Borrow as a [`Packet`] view.
    pub fn as_packet(&self) -> Packet<'_> {
        Packet::from_validated(&self.frame)
    }

    /// The whole frame including header and checksum.
    pub fn into_bytes(self) -> Bytes {
        self.frame
    }
}
