//! Error types for bitstream operations.

use thiserror::Error;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    /// A bit span reaches past the end of the buffer.
    #[error("bit span of {bits} bits at offset {offset} exceeds buffer of {available} bits")]
    OutOfBounds {
        /// First bit of the requested span.
        offset: usize,
        /// Number of bits requested.
        bits: usize,
        /// Number of bits the buffer holds.
        available: usize,
    },

    /// Invalid bit count for the operation.
    #[error("invalid bit count {bits}, maximum allowed is {max_bits}")]
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: usize,
        /// Maximum allowed bits for this operation.
        max_bits: usize,
    },

    /// Value exceeds the range representable by the specified number of bits.
    #[error("value {value} cannot be represented in {bits} bits")]
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: usize,
    },
}

/// Checks that `bits` bits starting at `offset` fit in a buffer of `len` bytes.
pub(crate) fn check_span(len: usize, offset: usize, bits: usize) -> BitResult<()> {
    let available = len.saturating_mul(8);
    match offset.checked_add(bits) {
        Some(end) if end <= available => Ok(()),
        _ => Err(BitError::OutOfBounds {
            offset,
            bits,
            available,
        }),
    }
}
