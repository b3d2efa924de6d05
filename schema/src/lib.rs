//! Capability tables for the hidp report codec.
//!
//! This crate defines the immutable description of a device's reports:
//! - Field capabilities (where a field lives, what usages it carries, how it scales)
//! - Collection definitions forming the device's logical hierarchy
//! - A validated builder and an identity tag checked by every query
//! - Deterministic table fingerprinting
//!
//! # Design Principles
//!
//! - **Read-only after construction** - Queries never mutate a table.
//! - **Validated at the edge** - The builder rejects tables the codec could not honour.
//! - **No descriptor parsing** - Tables are produced by a separate descriptor parser.
//! - **Deterministic hashing** - The fingerprint is stable given the same declarations.

mod error;
mod field;
mod hash;
mod table;

pub use error::{SchemaError, SchemaResult};
pub use field::{FieldCapability, MAIN_ITEM_NULL_STATE, MAIN_ITEM_RELATIVE, MAIN_ITEM_VARIABLE};
pub use hash::table_hash;
pub use table::{
    CapabilityTable, CollectionDef, ReportLayout, ReportType, TableBuilder, TABLE_MAGIC,
};

/// A usage page (namespace of usages).
pub type UsagePage = u16;

/// A usage within a page.
pub type Usage = u16;

/// A report ID carried in byte 0 of numbered reports.
pub type ReportId = u8;
