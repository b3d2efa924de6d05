//! Capability descriptions handed out to callers.

use schema::{CapabilityTable, FieldCapability, ReportId, ReportType, Usage, UsagePage};
use tracing::trace;

use crate::enumerate::{enumerate_caps, CapsFilter, Visit};
use crate::error::{HidpError, HidpResult};

/// Usages and data indices covered by a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapsRange {
    Single {
        usage: Usage,
        data_index: u16,
    },
    Range {
        usage_min: Usage,
        usage_max: Usage,
        data_index_min: u16,
        data_index_max: u16,
    },
}

impl CapsRange {
    fn of(cap: &FieldCapability) -> Self {
        if cap.is_range {
            Self::Range {
                usage_min: cap.usage_min,
                usage_max: cap.usage_max,
                data_index_min: cap.data_index_min,
                data_index_max: cap.data_index_max,
            }
        } else {
            Self::Single {
                usage: cap.usage_min,
                data_index: cap.data_index_min,
            }
        }
    }

    /// Returns `true` if `usage` is covered.
    #[must_use]
    pub const fn contains(&self, usage: Usage) -> bool {
        match *self {
            Self::Single { usage: single, .. } => single == usage,
            Self::Range {
                usage_min,
                usage_max,
                ..
            } => usage_min <= usage && usage <= usage_max,
        }
    }
}

/// A string or designator index, or a range of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRange {
    Single(u16),
    Range { min: u16, max: u16 },
}

impl IndexRange {
    const fn of(is_range: bool, min: u16, max: u16) -> Self {
        if is_range {
            Self::Range { min, max }
        } else {
            Self::Single(min)
        }
    }
}

/// Description of a button capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonCaps {
    pub usage_page: UsagePage,
    pub report_id: ReportId,
    pub link_collection: u16,
    pub link_usage_page: UsagePage,
    pub link_usage: Usage,
    pub bit_field: u16,
    pub is_absolute: bool,
    pub usages: CapsRange,
    pub strings: IndexRange,
    pub designators: IndexRange,
}

impl From<&FieldCapability> for ButtonCaps {
    fn from(cap: &FieldCapability) -> Self {
        Self {
            usage_page: cap.usage_page,
            report_id: cap.report_id,
            link_collection: cap.link_collection,
            link_usage_page: cap.link_usage_page,
            link_usage: cap.link_usage,
            bit_field: cap.bit_field,
            is_absolute: cap.is_absolute(),
            usages: CapsRange::of(cap),
            strings: IndexRange::of(cap.is_string_range, cap.string_min, cap.string_max),
            designators: IndexRange::of(
                cap.is_designator_range,
                cap.designator_min,
                cap.designator_max,
            ),
        }
    }
}

impl Default for ButtonCaps {
    fn default() -> Self {
        Self::from(&FieldCapability::padding(0, 0))
    }
}

/// Description of a value capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueCaps {
    pub usage_page: UsagePage,
    pub report_id: ReportId,
    pub link_collection: u16,
    pub link_usage_page: UsagePage,
    pub link_usage: Usage,
    pub bit_field: u16,
    pub is_absolute: bool,
    pub has_null: bool,
    pub bit_size: u16,
    /// Elements per usage; ranged capabilities report 1.
    pub report_count: u16,
    pub units_exp: u32,
    pub units: u32,
    pub logical_min: i32,
    pub logical_max: i32,
    pub physical_min: i32,
    pub physical_max: i32,
    pub usages: CapsRange,
    pub strings: IndexRange,
    pub designators: IndexRange,
}

impl From<&FieldCapability> for ValueCaps {
    fn from(cap: &FieldCapability) -> Self {
        Self {
            usage_page: cap.usage_page,
            report_id: cap.report_id,
            link_collection: cap.link_collection,
            link_usage_page: cap.link_usage_page,
            link_usage: cap.link_usage,
            bit_field: cap.bit_field,
            is_absolute: cap.is_absolute(),
            has_null: cap.has_null(),
            bit_size: cap.bit_size,
            report_count: if cap.is_range { 1 } else { cap.report_count },
            units_exp: cap.units_exp,
            units: cap.units,
            logical_min: cap.logical_min,
            logical_max: cap.logical_max,
            physical_min: cap.physical_min,
            physical_max: cap.physical_max,
            usages: CapsRange::of(cap),
            strings: IndexRange::of(cap.is_string_range, cap.string_min, cap.string_max),
            designators: IndexRange::of(
                cap.is_designator_range,
                cap.designator_min,
                cap.designator_max,
            ),
        }
    }
}

impl Default for ValueCaps {
    fn default() -> Self {
        Self::from(&FieldCapability::padding(0, 0))
    }
}

/// Per-report-type summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCaps {
    pub byte_length: u16,
    pub button_caps: u16,
    pub value_caps: u16,
    /// One past the highest data index in use.
    pub data_indices: u16,
}

/// Summary of a device's reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCaps {
    pub usage_page: UsagePage,
    pub usage: Usage,
    pub link_collection_nodes: u16,
    pub input: ReportCaps,
    pub output: ReportCaps,
    pub feature: ReportCaps,
}

impl DeviceCaps {
    #[must_use]
    pub const fn report(&self, report_type: ReportType) -> &ReportCaps {
        match report_type {
            ReportType::Input => &self.input,
            ReportType::Output => &self.output,
            ReportType::Feature => &self.feature,
        }
    }
}

fn saturating_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn report_caps(table: &CapabilityTable, report_type: ReportType) -> ReportCaps {
    let mut caps = ReportCaps {
        byte_length: table.report_length(report_type),
        ..ReportCaps::default()
    };
    for cap in table.fields(report_type) {
        if cap.is_padding() {
            continue;
        }
        if cap.is_button {
            caps.button_caps = caps.button_caps.saturating_add(1);
        } else {
            caps.value_caps = caps.value_caps.saturating_add(1);
        }
        caps.data_indices = caps.data_indices.max(cap.data_index_max.saturating_add(1));
    }
    caps
}

/// Summarizes the device described by `table`.
///
/// # Errors
///
/// [`HidpError::InvalidPreparsedData`] if the table is untagged.
pub fn get_caps(table: &CapabilityTable) -> HidpResult<DeviceCaps> {
    trace!(magic = table.magic(), "get_caps");

    if !table.is_valid() {
        return Err(HidpError::InvalidPreparsedData);
    }
    let (usage_page, usage) = table.top_level_usage();
    Ok(DeviceCaps {
        usage_page,
        usage,
        link_collection_nodes: saturating_u16(table.collections().len()),
        input: report_caps(table, ReportType::Input),
        output: report_caps(table, ReportType::Output),
        feature: report_caps(table, ReportType::Feature),
    })
}

/// Describes every button capability of `report_type`.
///
/// # Errors
///
/// Those of [`get_specific_button_caps`].
pub fn get_button_caps(
    table: &CapabilityTable,
    report_type: ReportType,
    caps: &mut [ButtonCaps],
) -> HidpResult<usize> {
    get_specific_button_caps(table, report_type, 0, 0, 0, caps)
}

/// Describes the button capabilities matching the selectors (zero matches
/// anything). Returns the number written.
///
/// # Errors
///
/// - [`HidpError::InvalidPreparsedData`] if the table is untagged.
/// - [`HidpError::BufferTooSmall`] with the match count if `caps` is short;
///   `caps` still holds the first matches.
/// - [`HidpError::UsageNotFound`] if nothing matches.
pub fn get_specific_button_caps(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usage: Usage,
    caps: &mut [ButtonCaps],
) -> HidpResult<usize> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage,
        caps_len = caps.len(),
        "get_specific_button_caps"
    );

    let filter = CapsFilter::buttons()
        .usage_page(usage_page)
        .collection(collection)
        .usage(usage);
    let capacity = caps.len();
    let mut out = caps.iter_mut();
    enumerate_caps(
        table,
        report_type,
        0,
        &filter,
        &mut |cap: &FieldCapability| {
            if let Some(slot) = out.next() {
                *slot = ButtonCaps::from(cap);
            }
            Visit::Matched
        },
        capacity,
    )
}

/// Describes every value capability of `report_type`.
///
/// # Errors
///
/// Those of [`get_specific_value_caps`].
pub fn get_value_caps(
    table: &CapabilityTable,
    report_type: ReportType,
    caps: &mut [ValueCaps],
) -> HidpResult<usize> {
    get_specific_value_caps(table, report_type, 0, 0, 0, caps)
}

/// Describes the value capabilities matching the selectors (zero matches
/// anything). Returns the number written.
///
/// # Errors
///
/// Those of [`get_specific_button_caps`].
pub fn get_specific_value_caps(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usage: Usage,
    caps: &mut [ValueCaps],
) -> HidpResult<usize> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage,
        caps_len = caps.len(),
        "get_specific_value_caps"
    );

    let filter = CapsFilter::values()
        .usage_page(usage_page)
        .collection(collection)
        .usage(usage);
    let capacity = caps.len();
    let mut out = caps.iter_mut();
    enumerate_caps(
        table,
        report_type,
        0,
        &filter,
        &mut |cap: &FieldCapability| {
            if let Some(slot) = out.next() {
                *slot = ValueCaps::from(cap);
            }
            Visit::Matched
        },
        capacity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{CollectionDef, TABLE_MAGIC};

    fn table() -> CapabilityTable {
        CapabilityTable::builder()
            .collection(CollectionDef::root(0x01, 0x05))
            .collection(CollectionDef::child(0, 0x01, 0x01, CollectionDef::PHYSICAL))
            .report_length(ReportType::Input, 4)
            .field(
                ReportType::Input,
                FieldCapability::buttons(0x09, 1, 8)
                    .at(8)
                    .report_id(1)
                    .data_index(0)
                    .strings(1, 3),
            )
            .field(
                ReportType::Input,
                FieldCapability::value(0x01, 0x30, 8)
                    .at(16)
                    .report_id(1)
                    .data_index(8)
                    .collection(1, 0x01, 0x01)
                    .null_state()
                    .designators(2, 2),
            )
            .field(
                ReportType::Input,
                FieldCapability::value(0x01, 0x31, 4)
                    .at(24)
                    .report_id(1)
                    .report_count(2)
                    .data_index(9),
            )
            .report_length(ReportType::Output, 2)
            .field(
                ReportType::Output,
                FieldCapability::value(0x08, 0x01, 8)
                    .at(8)
                    .report_id(2)
                    .data_index(0),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn device_summary() {
        let caps = get_caps(&table()).unwrap();
        assert_eq!((caps.usage_page, caps.usage), (0x01, 0x05));
        assert_eq!(caps.link_collection_nodes, 2);
        assert_eq!(
            caps.input,
            ReportCaps {
                byte_length: 4,
                button_caps: 1,
                value_caps: 2,
                data_indices: 10,
            }
        );
        assert_eq!(caps.report(ReportType::Output).value_caps, 1);
        assert_eq!(caps.report(ReportType::Feature).byte_length, 0);
    }

    #[test]
    fn device_summary_rejects_untagged_table() {
        let table = CapabilityTable::from_parts(
            TABLE_MAGIC.rotate_left(8),
            Default::default(),
            Vec::new(),
        );
        assert_eq!(get_caps(&table), Err(HidpError::InvalidPreparsedData));
    }

    #[test]
    fn button_caps_mapping() {
        let mut caps = [ButtonCaps::default(); 2];
        let count = get_button_caps(&table(), ReportType::Input, &mut caps).unwrap();
        assert_eq!(count, 1);
        let button = caps[0];
        assert_eq!(button.usage_page, 0x09);
        assert_eq!(button.report_id, 1);
        assert!(button.is_absolute);
        assert_eq!(
            button.usages,
            CapsRange::Range {
                usage_min: 1,
                usage_max: 8,
                data_index_min: 0,
                data_index_max: 7,
            }
        );
        assert_eq!(button.strings, IndexRange::Range { min: 1, max: 3 });
        assert_eq!(button.designators, IndexRange::Single(0));
        assert!(button.usages.contains(8));
        assert!(!button.usages.contains(9));
    }

    #[test]
    fn value_caps_mapping() {
        let mut caps = [ValueCaps::default(); 4];
        let count = get_value_caps(&table(), ReportType::Input, &mut caps).unwrap();
        assert_eq!(count, 2);

        let x = caps[0];
        assert_eq!(
            x.usages,
            CapsRange::Single {
                usage: 0x30,
                data_index: 8
            }
        );
        assert!(x.has_null);
        assert_eq!((x.link_collection, x.link_usage), (1, 0x01));
        assert_eq!(x.designators, IndexRange::Single(2));
        assert_eq!((x.logical_min, x.logical_max), (0, 255));

        assert_eq!(caps[1].report_count, 2);
        assert_eq!(caps[1].bit_size, 4);
    }

    #[test]
    fn specific_value_caps_filter() {
        let mut caps = [ValueCaps::default(); 4];
        let count =
            get_specific_value_caps(&table(), ReportType::Input, 0x01, 1, 0, &mut caps).unwrap();
        assert_eq!(count, 1);
        assert!(caps[0].usages.contains(0x30));

        assert_eq!(
            get_specific_value_caps(&table(), ReportType::Input, 0x01, 0, 0x40, &mut caps),
            Err(HidpError::UsageNotFound)
        );
    }

    #[test]
    fn caps_capacity_reports_required() {
        let mut caps = [ValueCaps::default(); 1];
        assert_eq!(
            get_value_caps(&table(), ReportType::Input, &mut caps),
            Err(HidpError::BufferTooSmall { required: 2 })
        );
        assert!(caps[0].usages.contains(0x30));

        assert_eq!(
            get_value_caps(&table(), ReportType::Input, &mut []),
            Err(HidpError::BufferTooSmall { required: 2 })
        );
    }

    #[test]
    fn ranged_value_caps_report_single_count() {
        let mut cap = FieldCapability::value(0x01, 0x30, 8).report_count(3);
        cap.usage_max = 0x32;
        cap.is_range = true;
        assert_eq!(ValueCaps::from(&cap).report_count, 1);
    }
}
