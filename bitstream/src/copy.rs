//! Arbitrary-offset bit copies and two's complement helpers.

use crate::error::{check_span, BitResult};

/// Copies `count` bits between byte buffers at an arbitrary bit offset.
///
/// A negative `shift` reads the source starting `-shift` bits in and writes
/// the destination from bit 0 (extracting a packed field into an aligned
/// register). A positive `shift` reads the source from bit 0 and writes the
/// destination starting `shift` bits in (inserting an aligned value into a
/// packed position).
///
/// Destination bits outside the copied span keep their value, including the
/// bits of other fields sharing the first or last byte.
///
/// # Errors
///
/// Returns [`BitError::OutOfBounds`](crate::BitError::OutOfBounds) if either
/// span reaches past the end of its buffer. Nothing is written on error.
pub fn copy_bits(dst: &mut [u8], src: &[u8], count: usize, shift: isize) -> BitResult<()> {
    let src_offset = if shift < 0 { shift.unsigned_abs() } else { 0 };
    let dst_offset = if shift > 0 { shift.unsigned_abs() } else { 0 };
    check_span(src.len(), src_offset, count)?;
    check_span(dst.len(), dst_offset, count)?;
    if count == 0 {
        return Ok(());
    }

    let src = &src[src_offset / 8..];
    let dst = &mut dst[dst_offset / 8..];
    let src_shift = src_offset % 8;
    let dst_shift = dst_offset % 8;

    if src_shift == 0 && dst_shift == 0 {
        let whole = count / 8;
        dst[..whole].copy_from_slice(&src[..whole]);
        let tail = count % 8;
        if tail != 0 {
            merge(&mut dst[whole], src[whole], low_mask(tail));
        }
        return Ok(());
    }

    let mut copied = 0;
    while copied < count {
        let dst_bit = dst_shift + copied;
        let in_byte = dst_bit % 8;
        let take = (8 - in_byte).min(count - copied);
        let mask = low_mask(take);
        let bits = load_byte(src, src_shift + copied) & mask;
        merge(&mut dst[dst_bit / 8], bits << in_byte, mask << in_byte);
        copied += take;
    }
    Ok(())
}

/// Sign-extends the low `bits` bits of `value` to a full `i32`.
///
/// Widths of 0, 1 and 32 or more carry no usable sign bit and are returned
/// reinterpreted as-is. Bits above `bits` are not masked off first.
#[must_use]
pub const fn sign_extend(value: u32, bits: u32) -> i32 {
    if bits <= 1 || bits >= u32::BITS {
        return value as i32;
    }
    let sign = 1u32 << (bits - 1);
    value.wrapping_sub((value & sign) << 1) as i32
}

/// Returns a mask with the low `bits` bits set (`bits <= 8`).
const fn low_mask(bits: usize) -> u8 {
    if bits >= 8 {
        0xFF
    } else {
        (1u8 << bits) - 1
    }
}

fn merge(byte: &mut u8, bits: u8, mask: u8) {
    *byte = (bits & mask) | (*byte & !mask);
}

/// Loads the 8 bits starting at `bit` from `src`, zero-filling past the end.
fn load_byte(src: &[u8], bit: usize) -> u8 {
    let idx = bit / 8;
    let offset = bit % 8;
    let lo = src.get(idx).copied().unwrap_or(0);
    if offset == 0 {
        return lo;
    }
    let hi = src.get(idx + 1).copied().unwrap_or(0);
    ((u16::from(lo) | (u16::from(hi) << 8)) >> offset) as u8
}
