//! Low-level bit packing primitives for HID report buffers.
//!
//! This crate provides [`BitReader`] and [`BitWriter`] cursors and the
//! [`copy_bits`] primitive used to move arbitrarily aligned fields in and out
//! of report buffers.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about usages, pages, or capability tables.
//! - **Explicit errors** - All failures return structured errors, never panic.
//! - **Neighbour preserving** - Writes touch exactly the requested bits.
//!
//! # Example
//!
//! ```
//! use bitstream::{copy_bits, BitReader, BitWriter};
//!
//! let mut report = [0u8; 4];
//! let mut writer = BitWriter::at(&mut report, 12).unwrap();
//! writer.write_bits(42, 7).unwrap();
//!
//! let mut reader = BitReader::at(&report, 12).unwrap();
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//!
//! let mut value = [0u8; 1];
//! copy_bits(&mut value, &report, 7, -12).unwrap();
//! assert_eq!(value[0], 42);
//! ```

mod copy;
mod error;
mod reader;
mod writer;

pub use copy::{copy_bits, sign_extend};
pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;
