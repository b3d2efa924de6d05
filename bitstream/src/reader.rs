//! Bit-level reader with bounded operations.

use crate::error::{check_span, BitError, BitResult};

/// A bit-level reader over a report buffer.
///
/// Bits are numbered LSB-first: bit `n` lives in byte `n / 8` at position
/// `n % 8`. Multi-bit reads assemble the first bit read into the least
/// significant bit of the result.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` positioned at bit 0.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Creates a reader positioned at `bit_pos`.
    pub fn at(data: &'a [u8], bit_pos: usize) -> BitResult<Self> {
        let mut reader = Self::new(data);
        reader.seek(bit_pos)?;
        Ok(reader)
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Moves the cursor to an absolute bit position.
    ///
    /// Seeking to the very end of the buffer is allowed.
    pub fn seek(&mut self, bit_pos: usize) -> BitResult<()> {
        check_span(self.data.len(), bit_pos, 0)?;
        self.bit_pos = bit_pos;
        Ok(())
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        check_span(self.data.len(), self.bit_pos, 1)?;
        let byte = self.data[self.bit_pos / 8];
        let bit = (byte >> (self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 64 bits as an unsigned integer.
    pub fn read_bits(&mut self, bits: usize) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        check_span(self.data.len(), self.bit_pos, bits)?;

        let mut value = 0u64;
        for i in 0..bits {
            value |= u64::from(self.read_bit()?) << i;
        }
        Ok(value)
    }
}
