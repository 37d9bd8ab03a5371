//! Streaming CRC16 (reflected CCITT construction, 0 seed, no final xor).
//!
//! Checked against the peer bit for bit. The standard check input
//! `"123456789"` yields `0x2189`.

/// Fold one byte into `acc`.
pub const fn crc16_add(acc: u16, byte: u8) -> u16 {
    let mut acc = acc ^ byte as u16;
    acc = acc.swap_bytes();
    acc ^= (acc & 0xff00) << 4;
    acc ^= (acc >> 8) >> 4;
    acc ^= (acc & 0xff00) >> 5;
    acc
}

/// CRC16 of `data` starting from zero.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = Crc16::new();
    crc.update(data);
    crc.value()
}

/// Running CRC16 accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc16(u16);

impl Crc16 {
    /// A zeroed accumulator.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Back to zero, ready for a new frame.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Fold one byte.
    pub fn add(&mut self, byte: u8) {
        self.0 = crc16_add(self.0, byte);
    }

    /// Fold every byte of `data`.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.add(byte);
        }
    }

    /// Current checksum. There is no finalization step.
    pub const fn value(&self) -> u16 {
        self.0
    }
}
