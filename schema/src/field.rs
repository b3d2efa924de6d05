//! Field capability definitions.

use crate::{ReportId, Usage, UsagePage};

/// Main item flag: the field is a variable (bitmap/value) rather than an array.
pub const MAIN_ITEM_VARIABLE: u16 = 0x0002;
/// Main item flag: the field reports relative rather than absolute data.
pub const MAIN_ITEM_RELATIVE: u16 = 0x0004;
/// Main item flag: the field has a null state outside its logical range.
pub const MAIN_ITEM_NULL_STATE: u16 = 0x0040;

/// One field of a report as described by the capability table.
///
/// A capability covers `report_count` elements of `bit_size` bits starting at
/// `start_bit` (bit 0 is the least significant bit of byte 0, which holds the
/// report ID). `usage_min == usage_max == 0` marks padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldCapability {
    pub usage_page: UsagePage,
    pub usage_min: Usage,
    pub usage_max: Usage,
    /// Report the field belongs to; 0 when the device uses no report IDs.
    pub report_id: ReportId,
    pub link_collection: u16,
    pub link_usage_page: UsagePage,
    pub link_usage: Usage,
    /// Raw main item data (`MAIN_ITEM_*` flags).
    pub bit_field: u16,
    pub is_button: bool,
    pub is_range: bool,
    pub is_string_range: bool,
    pub is_designator_range: bool,
    pub start_bit: u32,
    pub bit_size: u16,
    pub report_count: u16,
    /// Selector value of `usage_min` in array fields.
    pub start_index: u16,
    pub data_index_min: u16,
    pub data_index_max: u16,
    pub string_min: u16,
    pub string_max: u16,
    pub designator_min: u16,
    pub designator_max: u16,
    pub logical_min: i32,
    pub logical_max: i32,
    pub physical_min: i32,
    pub physical_max: i32,
    pub units: u32,
    pub units_exp: u32,
}

impl FieldCapability {
    const EMPTY: Self = Self {
        usage_page: 0,
        usage_min: 0,
        usage_max: 0,
        report_id: 0,
        link_collection: 0,
        link_usage_page: 0,
        link_usage: 0,
        bit_field: MAIN_ITEM_VARIABLE,
        is_button: false,
        is_range: false,
        is_string_range: false,
        is_designator_range: false,
        start_bit: 0,
        bit_size: 0,
        report_count: 0,
        start_index: 0,
        data_index_min: 0,
        data_index_max: 0,
        string_min: 0,
        string_max: 0,
        designator_min: 0,
        designator_max: 0,
        logical_min: 0,
        logical_max: 0,
        physical_min: 0,
        physical_max: 0,
        units: 0,
        units_exp: 0,
    };

    /// Creates a padding entry covering `report_count * bit_size` bits.
    #[must_use]
    pub const fn padding(bit_size: u16, report_count: u16) -> Self {
        Self {
            bit_size,
            report_count,
            ..Self::EMPTY
        }
    }

    /// Creates a single one-bit button.
    #[must_use]
    pub const fn button(usage_page: UsagePage, usage: Usage) -> Self {
        Self::buttons(usage_page, usage, usage)
    }

    /// Creates a bitmap of one-bit buttons, one per usage in `usage_min..=usage_max`.
    #[must_use]
    pub const fn buttons(usage_page: UsagePage, usage_min: Usage, usage_max: Usage) -> Self {
        let count = usage_max.saturating_sub(usage_min).saturating_add(1);
        Self {
            usage_page,
            usage_min,
            usage_max,
            is_button: true,
            is_range: usage_min != usage_max,
            bit_size: 1,
            report_count: count,
            data_index_max: count - 1,
            logical_max: 1,
            ..Self::EMPTY
        }
    }

    /// Creates an array of `slots` selectors of `slot_bits` bits each, selecting
    /// among `usage_min..=usage_max`. Selector `1` denotes `usage_min`.
    #[must_use]
    pub const fn button_array(
        usage_page: UsagePage,
        usage_min: Usage,
        usage_max: Usage,
        slots: u16,
        slot_bits: u16,
    ) -> Self {
        let count = usage_max.saturating_sub(usage_min).saturating_add(1);
        Self {
            usage_page,
            usage_min,
            usage_max,
            bit_field: 0,
            is_button: true,
            is_range: usage_min != usage_max,
            bit_size: slot_bits,
            report_count: slots,
            start_index: 1,
            data_index_max: count - 1,
            logical_min: 1,
            logical_max: count as i32,
            ..Self::EMPTY
        }
    }

    /// Creates a single unsigned value of `bit_size` bits with the full
    /// unsigned logical range.
    #[must_use]
    pub const fn value(usage_page: UsagePage, usage: Usage, bit_size: u16) -> Self {
        let logical_max = if bit_size >= 31 {
            i32::MAX
        } else {
            (1i32 << bit_size) - 1
        };
        Self {
            usage_page,
            usage_min: usage,
            usage_max: usage,
            bit_size,
            report_count: 1,
            logical_max,
            ..Self::EMPTY
        }
    }

    /// Places the field at `start_bit`.
    #[must_use]
    pub const fn at(mut self, start_bit: u32) -> Self {
        self.start_bit = start_bit;
        self
    }

    /// Sets the report the field belongs to.
    #[must_use]
    pub const fn report_id(mut self, report_id: ReportId) -> Self {
        self.report_id = report_id;
        self
    }

    /// Sets the number of elements.
    #[must_use]
    pub const fn report_count(mut self, report_count: u16) -> Self {
        self.report_count = report_count;
        self
    }

    /// Sets the logical (encoded) range.
    #[must_use]
    pub const fn logical(mut self, min: i32, max: i32) -> Self {
        self.logical_min = min;
        self.logical_max = max;
        self
    }

    /// Sets the physical (scaled) range.
    #[must_use]
    pub const fn physical(mut self, min: i32, max: i32) -> Self {
        self.physical_min = min;
        self.physical_max = max;
        self
    }

    /// Sets the unit system and exponent.
    #[must_use]
    pub const fn units(mut self, units: u32, units_exp: u32) -> Self {
        self.units = units;
        self.units_exp = units_exp;
        self
    }

    /// Links the field to a collection node.
    #[must_use]
    pub const fn collection(mut self, index: u16, usage_page: UsagePage, usage: Usage) -> Self {
        self.link_collection = index;
        self.link_usage_page = usage_page;
        self.link_usage = usage;
        self
    }

    /// Assigns data indices starting at `first`, one per usage.
    #[must_use]
    pub const fn data_index(mut self, first: u16) -> Self {
        let span = self.usage_max.saturating_sub(self.usage_min);
        self.data_index_min = first;
        self.data_index_max = first.saturating_add(span);
        self
    }

    /// Sets the selector value that denotes `usage_min` in an array field.
    #[must_use]
    pub const fn start_index(mut self, start_index: u16) -> Self {
        self.start_index = start_index;
        self
    }

    /// Marks the field as relative.
    #[must_use]
    pub const fn relative(mut self) -> Self {
        self.bit_field |= MAIN_ITEM_RELATIVE;
        self
    }

    /// Marks the field as having a null state.
    #[must_use]
    pub const fn null_state(mut self) -> Self {
        self.bit_field |= MAIN_ITEM_NULL_STATE;
        self
    }

    /// Sets the string descriptor index range.
    #[must_use]
    pub const fn strings(mut self, min: u16, max: u16) -> Self {
        self.string_min = min;
        self.string_max = max;
        self.is_string_range = min != max;
        self
    }

    /// Sets the physical designator index range.
    #[must_use]
    pub const fn designators(mut self, min: u16, max: u16) -> Self {
        self.designator_min = min;
        self.designator_max = max;
        self.is_designator_range = min != max;
        self
    }

    /// Returns `true` for padding entries skipped by every query.
    #[must_use]
    pub const fn is_padding(&self) -> bool {
        self.usage_min == 0 && self.usage_max == 0
    }

    /// Returns `true` if the field holds selectors rather than one bit per usage.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.bit_field & MAIN_ITEM_VARIABLE == 0
    }

    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.bit_field & MAIN_ITEM_RELATIVE == 0
    }

    #[must_use]
    pub const fn has_null(&self) -> bool {
        self.bit_field & MAIN_ITEM_NULL_STATE != 0
    }

    /// Total number of bits the field spans.
    #[must_use]
    pub const fn bit_count(&self) -> u32 {
        self.bit_size as u32 * self.report_count as u32
    }

    /// First bit past the field.
    #[must_use]
    pub const fn end_bit(&self) -> u64 {
        self.start_bit as u64 + self.bit_count() as u64
    }

    /// Returns `true` if `usage` lies in `usage_min..=usage_max`.
    #[must_use]
    pub const fn contains_usage(&self, usage: Usage) -> bool {
        self.usage_min <= usage && usage <= self.usage_max
    }
}
