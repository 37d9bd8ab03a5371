//! SLIP framing, CRC16 checksums and packet validation.
//!
//! Every packet on the wire is a SLIP frame:
//! - `END` (0xC0) delimiters on both sides
//! - `END`/`ESC` inside the body escaped as `ESC ESC_END` / `ESC ESC_ESC`
//! - an 8-byte header (command, argument count, value), optional
//!   length-prefixed arguments padded to 4 bytes, and a trailing CRC16
//!
//! Multi-byte fields are little-endian. Nothing here allocates on the receive
//! path: frames are assembled into a fixed-size array and packets are views
//! into it.

pub mod assembler;
pub mod command;
pub mod crc;
pub mod error;
pub mod packet;
pub mod request;
pub mod slip;

pub use assembler::{FrameAssembler, Push};
pub use command::Command;
pub use crc::{crc16, Crc16};
pub use error::{FrameError, Result};
pub use packet::{
    check_packet, Arguments, OwnedPacket, Packet, Summary, CRC_SIZE, HEADER_SIZE, MIN_FRAME_SIZE,
};
pub use request::{padding_for, RequestWriter};
pub use slip::{Decoded, SlipDecoder, END, ESC, ESC_END, ESC_ESC};
