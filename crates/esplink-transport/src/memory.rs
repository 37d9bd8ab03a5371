use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory transport with separate inbound and outbound queues.
///
/// Inbound bytes are queued with [`push_inbound`](Self::push_inbound) and
/// consumed by `read_byte`. Everything written is collected and can be taken
/// with [`take_outbound`](Self::take_outbound).
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    inbound: BytesMut,
    outbound: BytesMut,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with `bytes` already waiting to be read.
    pub fn with_inbound(bytes: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.push_inbound(bytes);
        transport
    }

    /// Queue bytes for the reading side.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.put_slice(bytes);
    }

    /// Number of inbound bytes not yet read.
    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }

    /// Bytes written so far, without consuming them.
    pub fn outbound(&self) -> &[u8] {
        &self.outbound
    }

    /// Take every byte written so far.
    pub fn take_outbound(&mut self) -> Bytes {
        self.outbound.split().freeze()
    }
}

impl Transport for MemoryTransport {
    fn is_byte_available(&mut self) -> bool {
        self.inbound.has_remaining()
    }

    fn read_byte(&mut self) -> Result<u8> {
        if !self.inbound.has_remaining() {
            return Err(TransportError::Empty);
        }
        Ok(self.inbound.get_u8())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.outbound.put_u8(byte);
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.outbound.put_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_inbound_in_order() {
        let mut transport = MemoryTransport::with_inbound(&[1, 2, 3]);

        assert!(transport.is_byte_available());
        assert_eq!(transport.read_byte().unwrap(), 1);
        assert_eq!(transport.read_byte().unwrap(), 2);
        assert_eq!(transport.inbound_len(), 1);
        assert_eq!(transport.read_byte().unwrap(), 3);
        assert!(!transport.is_byte_available());
    }

    #[test]
    fn read_on_empty_is_an_error() {
        let mut transport = MemoryTransport::new();
        assert!(matches!(transport.read_byte(), Err(TransportError::Empty)));
    }

    #[test]
    fn collects_outbound() {
        let mut transport = MemoryTransport::new();
        transport.write_byte(0xC0).unwrap();
        transport.write_all(b"ok").unwrap();

        assert_eq!(transport.outbound(), &[0xC0, b'o', b'k']);
        let taken = transport.take_outbound();
        assert_eq!(taken.as_ref(), &[0xC0, b'o', b'k']);
        assert!(transport.outbound().is_empty());
    }

    #[test]
    fn push_after_drain_is_readable() {
        let mut transport = MemoryTransport::with_inbound(&[9]);
        transport.read_byte().unwrap();
        transport.push_inbound(&[10, 11]);

        assert_eq!(transport.read_byte().unwrap(), 10);
        assert_eq!(transport.read_byte().unwrap(), 11);
    }

    fn echo_one<T: Transport>(mut transport: T) -> u8 {
        assert!(transport.is_byte_available());
        let byte = transport.read_byte().unwrap();
        transport.write_byte(byte + 1).unwrap();
        byte
    }

    #[test]
    fn works_through_mutable_reference() {
        let mut transport = MemoryTransport::with_inbound(&[7]);

        assert_eq!(echo_one(&mut transport), 7);
        assert_eq!(transport.outbound(), &[8]);
    }

    #[test]
    fn works_boxed() {
        let boxed: Box<MemoryTransport> = Box::new(MemoryTransport::with_inbound(&[1]));
        assert_eq!(echo_one(boxed), 1);
    }
}
