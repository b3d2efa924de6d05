//! In-place bit-level writer for report buffers.

use crate::error::{check_span, BitError, BitResult};

/// A bit-level writer that patches an existing byte buffer.
///
/// Unlike a streaming encoder, the writer never touches bits it was not asked
/// to write: neighbouring fields that share a byte with the written span keep
/// their value. Bit numbering matches [`BitReader`](crate::BitReader).
#[derive(Debug)]
pub struct BitWriter<'a> {
    data: &'a mut [u8],
    bit_pos: usize,
}

impl<'a> BitWriter<'a> {
    /// Creates a new `BitWriter` positioned at bit 0.
    #[must_use]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Creates a writer positioned at `bit_pos`.
    pub fn at(data: &'a mut [u8], bit_pos: usize) -> BitResult<Self> {
        let mut writer = Self::new(data);
        writer.seek(bit_pos)?;
        Ok(writer)
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Returns the number of bits left before the end of the buffer.
    #[must_use]
    pub fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Moves the cursor to an absolute bit position.
    pub fn seek(&mut self, bit_pos: usize) -> BitResult<()> {
        check_span(self.data.len(), bit_pos, 0)?;
        self.bit_pos = bit_pos;
        Ok(())
    }

    /// Writes a single bit, leaving the other bits of its byte untouched.
    pub fn write_bit(&mut self, value: bool) -> BitResult<()> {
        check_span(self.data.len(), self.bit_pos, 1)?;
        let mask = 1u8 << (self.bit_pos % 8);
        let byte = &mut self.data[self.bit_pos / 8];
        if value {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        self.bit_pos += 1;
        Ok(())
    }

    /// Writes up to 64 bits from an unsigned integer, least significant bit first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`,
    /// [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`, and
    /// [`BitError::OutOfBounds`] if the span passes the end of the buffer.
    /// Nothing is written on error.
    pub fn write_bits(&mut self, value: u64, bits: usize) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits < 64 && value >> bits != 0 {
            return Err(BitError::ValueOutOfRange { value, bits });
        }
        check_span(self.data.len(), self.bit_pos, bits)?;

        for i in 0..bits {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }
}
