//! This module contains the MSB-first bit packer used by the Huffman encoder.
//!
//! Codes are shifted into a 64-bit scratch register. Complete bytes only move
//! to the output buffer once the register holds at least `HIGH_WATER_BITS`,
//! so the output `Vec` is touched once per several codes rather than per code.
//!
//! The output buffer can be drained between writes. Bits still sitting in the
//! register are not part of a drain and survive it.

/// Register fill level that triggers a flush of complete bytes.
pub const HIGH_WATER_BITS: u32 = 56;

/// Longest code the writer accepts in a single call.
pub const MAX_WRITE_BITS: u32 = 32;

#[derive(Debug)]
pub struct BitWriter {
    /// Pending bits, right-aligned; only the low `bit_count` bits are live.
    register: u64,
    bit_count: u32,
    output: Vec<u8>,
    capacity: usize,
    safety_margin: usize,
    /// Bits accepted since the last `finish`.
    bits_written: u64,
}

impl BitWriter {
    pub fn new(capacity: usize, safety_margin: usize) -> Self {
        Self {
            register: 0,
            bit_count: 0,
            output: Vec::with_capacity(capacity),
            capacity,
            safety_margin,
            bits_written: 0,
        }
    }

    /// Appends the low `len` bits of `bits`, most significant bit first.
    #[inline(always)]
    pub fn write(&mut self, bits: u32, len: u32) {
        debug_assert!(len <= MAX_WRITE_BITS);
        if self.bit_count + len > u64::BITS {
            self.flush_complete_bytes();
        }
        let mask = if len == 0 { 0 } else { u64::MAX >> (u64::BITS - len) };
        self.register = (self.register << len) | (bits as u64 & mask);
        self.bit_count += len;
        self.bits_written += len as u64;
        if self.bit_count >= HIGH_WATER_BITS {
            self.flush_complete_bytes();
        }
    }

    /// Moves every complete byte from the register into the output buffer.
    #[inline(always)]
    fn flush_complete_bytes(&mut self) {
        while self.bit_count >= 8 {
            self.bit_count -= 8;
            self.output.push((self.register >> self.bit_count) as u8);
        }
    }

    /// True once the output buffer is within the safety margin of its capacity.
    pub fn should_drain(&self) -> bool {
        self.output.len() + self.safety_margin >= self.capacity
    }

    /// Takes the buffered bytes, leaving an empty buffer of the same capacity.
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.output, Vec::with_capacity(self.capacity))
    }

    /// Bytes currently waiting in the output buffer.
    pub fn buffered_len(&self) -> usize {
        self.output.len()
    }

    /// Total bits accepted since construction or the last `finish`.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Flushes all remaining bits and resets the writer for reuse.
    ///
    /// Returns the final bytes together with the number of low padding bits in
    /// the last byte (0-7). A trailing partial byte is left-aligned.
    pub fn finish(&mut self) -> (Vec<u8>, u8) {
        self.flush_complete_bytes();
        let mut padding_bits = 0u8;
        if self.bit_count > 0 {
            let live = self.register & ((1u64 << self.bit_count) - 1);
            self.output.push((live << (8 - self.bit_count)) as u8);
            padding_bits = (8 - self.bit_count) as u8;
        }
        let bytes = self.drain();
        self.register = 0;
        self.bit_count = 0;
        self.bits_written = 0;
        (bytes, padding_bits)
    }
}

/// Padding bits needed to byte-align a stream of `total_bits`.
pub fn padding_for(total_bits: u64) -> u8 {
    ((8 - total_bits % 8) % 8) as u8
}

/// Bytes occupied by a stream of `total_bits` once padded.
pub fn padded_len(total_bits: u64) -> u64 {
    total_bits.div_ceil(8)
}
