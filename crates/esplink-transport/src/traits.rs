use crate::error::Result;

/// A polled, byte-oriented serial device.
///
/// Implementations carry no framing knowledge. `read_byte` is only expected to
/// succeed after `is_byte_available` returned `true`; a transport may block or
/// return [`TransportError::Empty`](crate::TransportError::Empty) otherwise.
pub trait Transport {
    /// Returns true if at least one inbound byte can be read without waiting.
    fn is_byte_available(&mut self) -> bool;

    /// Read one inbound byte.
    fn read_byte(&mut self) -> Result<u8>;

    /// Write one outbound byte.
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Write every byte of `bytes` in order.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn is_byte_available(&mut self) -> bool {
        (**self).is_byte_available()
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_byte_available(&mut self) -> bool {
        (**self).is_byte_available()
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }
}
