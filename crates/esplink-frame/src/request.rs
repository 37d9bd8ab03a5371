use esplink_transport::Transport;
use tracing::trace;

use crate::crc::Crc16;
use crate::error::{FrameError, Result};
use crate::slip::{write_escaped, END};

/// Zero bytes needed to bring `len` up to a multiple of 4.
pub const fn padding_for(len: usize) -> usize {
    (4 - (len & 3)) & 3
}

/// Streams an outbound request straight to a transport.
///
/// Nothing is buffered: each field is escaped and folded into the running
/// CRC as it is written. A request is
/// [`begin`](Self::begin), any number of
/// [`add_parameter`](Self::add_parameter), then [`finish`](Self::finish).
///
/// ```text
/// END | command u16 | argc u16 | value u32 | (len u16 | bytes | pad)* | crc u16 | END
/// ```
#[derive(Debug, Default, Clone)]
pub struct RequestWriter {
    crc: Crc16,
}

impl RequestWriter {
    /// Create a writer with a zeroed CRC.
    pub const fn new() -> Self {
        Self { crc: Crc16::new() }
    }

    /// Open a frame and write the header.
    pub fn begin<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        command: u16,
        value: u32,
        argc: u16,
    ) -> Result<()> {
        transport.write_byte(END)?;
        self.crc.reset();
        self.write_field(transport, &command.to_le_bytes())?;
        self.write_field(transport, &argc.to_le_bytes())?;
        self.write_field(transport, &value.to_le_bytes())?;
        trace!(command, argc, value, "request header sent");
        Ok(())
    }

    /// Write one length-prefixed parameter followed by its zero padding.
    pub fn add_parameter<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        data: &[u8],
    ) -> Result<()> {
        let len = u16::try_from(data.len()).map_err(|_| FrameError::ParameterTooLong {
            len: data.len(),
            max: u16::MAX as usize,
        })?;

        self.write_field(transport, &len.to_le_bytes())?;
        self.write_field(transport, data)?;

        // zero never needs escaping
        for _ in 0..padding_for(data.len()) {
            self.crc.add(0);
            transport.write_byte(0)?;
        }
        Ok(())
    }

    /// Write the checksum and the closing delimiter.
    pub fn finish<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        let crc = self.crc.value();
        for byte in crc.to_le_bytes() {
            write_escaped(transport, byte)?;
        }
        transport.write_byte(END)?;
        trace!(crc, "request finalized");
        Ok(())
    }

    /// CRC over everything written since [`begin`](Self::begin).
    pub fn running_crc(&self) -> u16 {
        self.crc.value()
    }

    fn write_field<T: Transport + ?Sized>(&mut self, transport: &mut T, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.crc.add(byte);
            write_escaped(transport, byte)?;
        }
        Ok(())
    }
}
