//! Error and status types for report queries.

use bitstream::BitError;
use schema::{ReportId, SchemaError};
use thiserror::Error;

/// Result type for report queries.
pub type HidpResult<T> = Result<T, HidpError>;

/// Errors returned by capability queries and report encoding/decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HidpError {
    /// The table is untagged or points outside its own reports.
    #[error("invalid capability table")]
    InvalidPreparsedData,

    /// Raw report type outside input/output/feature.
    #[error("invalid report type")]
    InvalidReportType,

    /// The report buffer does not have the declared length.
    #[error("invalid report length: expected {expected} bytes, got {actual}")]
    InvalidReportLength { expected: usize, actual: usize },

    /// An output buffer or register is too small; `required` is the entry
    /// (or byte) count that would have succeeded.
    #[error("buffer too small: {required} required")]
    BufferTooSmall { required: usize },

    /// No field matches the requested usage.
    #[error("usage not found")]
    UsageNotFound,

    /// Matching fields exist, but only in reports with a different ID.
    #[error("usage exists only in a report with a different id")]
    IncompatibleReportId,

    /// No field is declared for the report ID.
    #[error("report {report_id} does not exist")]
    ReportDoesNotExist { report_id: ReportId },

    /// An array query hit a field that is not a value array.
    #[error("field is not a value array")]
    NotValueArray,

    /// A value lies outside its logical or physical range.
    #[error("value out of range")]
    ValueOutOfRange,

    /// The field declares an inverted logical or physical range.
    #[error("inconsistent logical/physical ranges")]
    BadLogPhyValues,
}

impl HidpError {
    /// Returns the status this error reports.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::InvalidPreparsedData => Status::InvalidPreparsedData,
            Self::InvalidReportType => Status::InvalidReportType,
            Self::InvalidReportLength { .. } => Status::InvalidReportLength,
            Self::BufferTooSmall { .. } => Status::BufferTooSmall,
            Self::UsageNotFound => Status::UsageNotFound,
            Self::IncompatibleReportId => Status::IncompatibleReportId,
            Self::ReportDoesNotExist { .. } => Status::ReportDoesNotExist,
            Self::NotValueArray => Status::NotValueArray,
            Self::ValueOutOfRange => Status::ValueOutOfRange,
            Self::BadLogPhyValues => Status::BadLogPhyValues,
        }
    }
}

impl From<SchemaError> for HidpError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::InvalidReportType { .. } => Self::InvalidReportType,
            _ => Self::InvalidPreparsedData,
        }
    }
}

/// A field access fell outside the report: the table is inconsistent with
/// the length it declares.
impl From<BitError> for HidpError {
    fn from(_: BitError) -> Self {
        Self::InvalidPreparsedData
    }
}

/// Outcome vocabulary shared with the platform HID parser interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    InvalidPreparsedData,
    InvalidReportType,
    InvalidReportLength,
    BufferTooSmall,
    UsageNotFound,
    IncompatibleReportId,
    ReportDoesNotExist,
    NotValueArray,
    ValueOutOfRange,
    BadLogPhyValues,
}

impl Status {
    /// Conventional 32-bit status code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Success => 0x0011_0000,
            Self::InvalidPreparsedData => 0xC011_0001,
            Self::InvalidReportType => 0xC011_0002,
            Self::InvalidReportLength => 0xC011_0003,
            Self::UsageNotFound => 0xC011_0004,
            Self::ValueOutOfRange => 0xC011_0005,
            Self::BadLogPhyValues => 0xC011_0006,
            Self::BufferTooSmall => 0xC011_0007,
            Self::IncompatibleReportId => 0xC011_000A,
            Self::NotValueArray => 0xC011_000B,
            Self::ReportDoesNotExist => 0xC011_0010,
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl<T> From<&HidpResult<T>> for Status {
    fn from(result: &HidpResult<T>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => err.status(),
        }
    }
}
