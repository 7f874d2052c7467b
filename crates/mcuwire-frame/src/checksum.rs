/// Running modulo-256 sum over header and payload bytes.
///
/// Both directions use the same accumulator: the encoder sums what it
/// writes, the decoder sums what it reads and compares against the trailing
/// checksum byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    acc: u8,
}

impl Checksum {
    /// A fresh accumulator at zero.
    pub const fn new() -> Self {
        Self { acc: 0 }
    }

    /// Restart the sum from `byte` (the version byte opens every frame).
    pub fn start(byte: u8) -> Self {
        Self { acc: byte }
    }

    /// Add one byte.
    pub fn push(&mut self, byte: u8) {
        self.acc = self.acc.wrapping_add(byte);
    }

    /// Add a run of bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Current sum, already truncated to one byte.
    pub fn value(&self) -> u8 {
        self.acc
    }

    /// Reset to zero.
    pub fn reset(&mut self) {
        self.acc = 0;
    }
}

/// Checksum of a complete header + payload run.
pub fn checksum(bytes: &[u8]) -> u8 {
    let mut sum = Checksum::new();
    sum.extend(bytes);
    sum.value()
}
