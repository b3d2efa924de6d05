//! Capability table validation errors.

use thiserror::Error;

use crate::{ReportType, Usage};

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a capability table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The table does not carry the capability table identity tag.
    #[error("invalid table tag 0x{found:016X}")]
    InvalidMagic { found: u64 },

    /// Raw report type outside input/output/feature.
    #[error("invalid report type {raw}")]
    InvalidReportType { raw: u8 },

    /// A non-range capability declares distinct usage bounds.
    #[error("{report_type:?} field {index}: usages {usage_min:#06x}..{usage_max:#06x} not a range")]
    RangeMismatch {
        report_type: ReportType,
        index: usize,
        usage_min: Usage,
        usage_max: Usage,
    },

    /// A capability declares `usage_min > usage_max`.
    #[error("{report_type:?} field {index}: inverted usages {usage_min:#06x}..{usage_max:#06x}")]
    InvertedUsageRange {
        report_type: ReportType,
        index: usize,
        usage_min: Usage,
        usage_max: Usage,
    },

    /// Element bit width larger than a 32-bit register.
    #[error("{report_type:?} field {index}: invalid bit width {bits}")]
    InvalidBitWidth {
        report_type: ReportType,
        index: usize,
        bits: u16,
    },

    /// A field's bit span ends past the declared report length.
    #[error("{report_type:?} field {index}: ends at bit {end_bit} past {report_bits} bits")]
    FieldOutOfBounds {
        report_type: ReportType,
        index: usize,
        end_bit: u64,
        report_bits: u64,
    },

    /// A field links to a collection index that does not exist.
    #[error("{report_type:?} field {index}: unknown link collection {collection}")]
    UnknownCollection {
        report_type: ReportType,
        index: usize,
        collection: u16,
    },

    /// A collection's parent does not precede it.
    #[error("collection {index}: parent {parent} must precede its child")]
    CollectionOrder { index: usize, parent: u16 },
}
