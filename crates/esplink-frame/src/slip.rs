//! SLIP byte stuffing.
//!
//! Encoding maps one body byte to one or two wire bytes. Decoding is a
//! byte-at-a-time state machine whose only state is whether the previous
//! byte was `ESC`.

use esplink_transport::Transport;

use crate::error::Result;

/// Frame delimiter.
pub const END: u8 = 0xC0;

/// Escape marker.
pub const ESC: u8 = 0xDB;

/// Escaped form of `END`.
pub const ESC_END: u8 = 0xDC;

/// Escaped form of `ESC`.
pub const ESC_ESC: u8 = 0xDD;

/// Wire form of a single body byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escaped {
    bytes: [u8; 2],
    len: usize,
}

impl Escaped {
    /// The wire bytes, one or two of them.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Escaped {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Escape one body byte.
pub const fn escape(byte: u8) -> Escaped {
    match byte {
        END => Escaped {
            bytes: [ESC, ESC_END],
            len: 2,
        },
        ESC => Escaped {
            bytes: [ESC, ESC_ESC],
            len: 2,
        },
        other => Escaped {
            bytes: [other, 0],
            len: 1,
        },
    }
}

/// Write one body byte to `transport`, escaped.
pub fn write_escaped<T: Transport + ?Sized>(transport: &mut T, byte: u8) -> Result<()> {
    transport.write_all(escape(byte).as_slice())?;
    Ok(())
}

/// Result of feeding one wire byte to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A body byte, already un-escaped.
    Byte(u8),
    /// An `ESC` was consumed; the next byte decides what it means.
    Pending,
    /// A frame delimiter.
    End,
}

/// Streaming SLIP decoder.
///
/// A byte following `ESC` that is neither `ESC_END` nor `ESC_ESC` is passed
/// through as-is; such frames are caught later by the checksum.
#[derive(Debug, Default, Clone)]
pub struct SlipDecoder {
    escaped: bool,
}

impl SlipDecoder {
    /// Create a decoder with no escape pending.
    pub const fn new() -> Self {
        Self { escaped: false }
    }

    /// Decode one wire byte.
    pub fn decode(&mut self, byte: u8) -> Decoded {
        match byte {
            END => {
                self.escaped = false;
                Decoded::End
            }
            ESC => {
                self.escaped = true;
                Decoded::Pending
            }
            _ if self.escaped => {
                self.escaped = false;
                Decoded::Byte(unescape(byte))
            }
            _ => Decoded::Byte(byte),
        }
    }

    /// True between an `ESC` and the byte it modifies.
    pub fn is_escape_pending(&self) -> bool {
        self.escaped
    }

    /// Forget any pending escape.
    pub fn reset(&mut self) {
        self.escaped = false;
    }
}

/// Translate the byte following `ESC`.
pub const fn unescape(byte: u8) -> u8 {
    match byte {
        ESC_END => END,
        ESC_ESC => ESC,
        other => other,
    }
}
