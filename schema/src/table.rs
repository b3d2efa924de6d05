//! The capability table and its validated builder.

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldCapability;
use crate::{Usage, UsagePage};

/// Identity tag stamped on every well-formed table (`b"HidP KDR"`).
pub const TABLE_MAGIC: u64 = u64::from_le_bytes(*b"HidP KDR");

/// The three kinds of report a device exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ReportType {
    Input = 0,
    Output = 1,
    Feature = 2,
}

impl ReportType {
    /// All report types in table order.
    pub const ALL: [Self; 3] = [Self::Input, Self::Output, Self::Feature];

    /// Position of this report type in per-type arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for ReportType {
    type Error = SchemaError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Input),
            1 => Ok(Self::Output),
            2 => Ok(Self::Feature),
            _ => Err(SchemaError::InvalidReportType { raw }),
        }
    }
}

/// Unlinked collection definition as stored in the table.
///
/// Node 0 is the top-level application collection. Every other node names a
/// parent that precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionDef {
    pub usage_page: UsagePage,
    pub usage: Usage,
    pub parent: u16,
    pub collection_type: u8,
}

impl CollectionDef {
    /// Collection type of a top-level application collection.
    pub const APPLICATION: u8 = 0x01;
    /// Collection type of a physical grouping.
    pub const PHYSICAL: u8 = 0x00;
    /// Collection type of a logical grouping.
    pub const LOGICAL: u8 = 0x02;

    /// Creates the top-level application collection.
    #[must_use]
    pub const fn root(usage_page: UsagePage, usage: Usage) -> Self {
        Self {
            usage_page,
            usage,
            parent: 0,
            collection_type: Self::APPLICATION,
        }
    }

    /// Creates a nested collection under `parent`.
    #[must_use]
    pub const fn child(
        parent: u16,
        usage_page: UsagePage,
        usage: Usage,
        collection_type: u8,
    ) -> Self {
        Self {
            usage_page,
            usage,
            parent,
            collection_type,
        }
    }
}

/// Declared length and fields of one report type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportLayout {
    /// Report length in bytes, including the report ID byte.
    pub byte_length: u16,
    pub fields: Vec<FieldCapability>,
}

impl ReportLayout {
    #[must_use]
    pub const fn new(byte_length: u16, fields: Vec<FieldCapability>) -> Self {
        Self {
            byte_length,
            fields,
        }
    }

    /// Report length in bits.
    #[must_use]
    pub const fn bit_length(&self) -> u64 {
        self.byte_length as u64 * 8
    }
}

/// Immutable description of every field a device reports.
///
/// Query operations only ever read a table. Tables built with
/// [`TableBuilder`] are validated and tagged; tables assembled with
/// [`CapabilityTable::from_parts`] or deserialized are not, and should be
/// checked with [`CapabilityTable::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapabilityTable {
    #[cfg_attr(feature = "serde", serde(default = "default_magic"))]
    magic: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    input: ReportLayout,
    #[cfg_attr(feature = "serde", serde(default))]
    output: ReportLayout,
    #[cfg_attr(feature = "serde", serde(default))]
    feature: ReportLayout,
    #[cfg_attr(feature = "serde", serde(default))]
    collections: Vec<CollectionDef>,
}

#[cfg(feature = "serde")]
const fn default_magic() -> u64 {
    TABLE_MAGIC
}

impl CapabilityTable {
    /// Starts building a validated table.
    #[must_use]
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Assembles a table without validation.
    #[must_use]
    pub fn from_parts(
        magic: u64,
        [input, output, feature]: [ReportLayout; 3],
        collections: Vec<CollectionDef>,
    ) -> Self {
        Self {
            magic,
            input,
            output,
            feature,
            collections,
        }
    }

    #[must_use]
    pub const fn magic(&self) -> u64 {
        self.magic
    }

    /// Returns `true` if the table carries the identity tag.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.magic == TABLE_MAGIC
    }

    #[must_use]
    pub const fn layout(&self, report_type: ReportType) -> &ReportLayout {
        match report_type {
            ReportType::Input => &self.input,
            ReportType::Output => &self.output,
            ReportType::Feature => &self.feature,
        }
    }

    /// Declared byte length of `report_type` reports (0 if the device has none).
    #[must_use]
    pub const fn report_length(&self, report_type: ReportType) -> u16 {
        self.layout(report_type).byte_length
    }

    /// Field capabilities of `report_type`, in declaration order.
    #[must_use]
    pub fn fields(&self, report_type: ReportType) -> &[FieldCapability] {
        &self.layout(report_type).fields
    }

    #[must_use]
    pub fn collections(&self) -> &[CollectionDef] {
        &self.collections
    }

    /// Usage page and usage of the top-level collection, `(0, 0)` if none.
    #[must_use]
    pub fn top_level_usage(&self) -> (UsagePage, Usage) {
        self.collections
            .first()
            .map_or((0, 0), |root| (root.usage_page, root.usage))
    }

    /// Checks the identity tag and every structural invariant.
    pub fn validate(&self) -> SchemaResult<()> {
        if !self.is_valid() {
            return Err(SchemaError::InvalidMagic { found: self.magic });
        }

        for (index, collection) in self.collections.iter().enumerate().skip(1) {
            if usize::from(collection.parent) >= index {
                return Err(SchemaError::CollectionOrder {
                    index,
                    parent: collection.parent,
                });
            }
        }

        for report_type in ReportType::ALL {
            let layout = self.layout(report_type);
            for (index, field) in layout.fields.iter().enumerate() {
                self.validate_field(report_type, layout, index, field)?;
            }
        }
        Ok(())
    }

    fn validate_field(
        &self,
        report_type: ReportType,
        layout: &ReportLayout,
        index: usize,
        field: &FieldCapability,
    ) -> SchemaResult<()> {
        if field.usage_min > field.usage_max {
            return Err(SchemaError::InvertedUsageRange {
                report_type,
                index,
                usage_min: field.usage_min,
                usage_max: field.usage_max,
            });
        }
        if !field.is_range && field.usage_min != field.usage_max {
            return Err(SchemaError::RangeMismatch {
                report_type,
                index,
                usage_min: field.usage_min,
                usage_max: field.usage_max,
            });
        }
        if field.bit_size > 32 {
            return Err(SchemaError::InvalidBitWidth {
                report_type,
                index,
                bits: field.bit_size,
            });
        }
        if field.link_collection != 0
            && usize::from(field.link_collection) >= self.collections.len()
        {
            return Err(SchemaError::UnknownCollection {
                report_type,
                index,
                collection: field.link_collection,
            });
        }
        if field.end_bit() > layout.bit_length() {
            return Err(SchemaError::FieldOutOfBounds {
                report_type,
                index,
                end_bit: field.end_bit(),
                report_bits: layout.bit_length(),
            });
        }
        Ok(())
    }
}

/// Incrementally assembles a [`CapabilityTable`].
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    layouts: [ReportLayout; 3],
    collections: Vec<CollectionDef>,
}

impl TableBuilder {
    /// Declares the byte length of `report_type` reports.
    #[must_use]
    pub fn report_length(mut self, report_type: ReportType, byte_length: u16) -> Self {
        self.layouts[report_type.index()].byte_length = byte_length;
        self
    }

    /// Appends a field to `report_type`.
    #[must_use]
    pub fn field(mut self, report_type: ReportType, field: FieldCapability) -> Self {
        self.layouts[report_type.index()].fields.push(field);
        self
    }

    /// Appends a collection node. The first one is the top-level collection.
    #[must_use]
    pub fn collection(mut self, collection: CollectionDef) -> Self {
        self.collections.push(collection);
        self
    }

    /// Stamps the identity tag and validates the table.
    pub fn build(self) -> SchemaResult<CapabilityTable> {
        let table = CapabilityTable::from_parts(TABLE_MAGIC, self.layouts, self.collections);
        table.validate()?;
        Ok(table)
    }
}
