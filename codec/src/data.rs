//! Generic active data extraction, keyed by data index.

use schema::{CapabilityTable, FieldCapability, ReportType};
use tracing::trace;

use crate::enumerate::{enumerate_caps, CapsFilter, Visit};
use crate::error::{HidpError, HidpResult};
use crate::report::{extract_register, report_id_of};
use crate::usages::for_each_active;

/// What a data item reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataValue {
    /// A button is pressed.
    On,
    /// Raw unscaled value of a single-element value field.
    Raw(u32),
}

/// One active item of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataItem {
    pub data_index: u16,
    pub value: DataValue,
}

impl Default for DataItem {
    fn default() -> Self {
        Self {
            data_index: 0,
            value: DataValue::Raw(0),
        }
    }
}

fn collect_data(
    report: &[u8],
    cap: &FieldCapability,
    mut emit: impl FnMut(DataItem),
) -> HidpResult<()> {
    if cap.bit_size == 0 {
        return Ok(());
    }
    if cap.is_array() || cap.is_button {
        return for_each_active(report, cap, |offset| {
            emit(DataItem {
                data_index: cap.data_index_min.wrapping_add(offset),
                value: DataValue::On,
            });
        });
    }
    if cap.report_count == 1 {
        emit(DataItem {
            data_index: cap.data_index_min,
            value: DataValue::Raw(extract_register(report, cap)?),
        });
    }
    Ok(())
}

/// Lists every pressed button and every single-element value of a report.
///
/// Returns the number of items. When `data` is too short it still holds the
/// first `data.len()` of them.
///
/// # Errors
///
/// - [`HidpError::InvalidReportLength`] for an empty or mis-sized report.
/// - [`HidpError::BufferTooSmall`] with the total count if `data` is short.
/// - The not-found errors of [`enumerate_caps`] if the report has no fields.
pub fn get_data(
    table: &CapabilityTable,
    report_type: ReportType,
    report: &[u8],
    data: &mut [DataItem],
) -> HidpResult<usize> {
    trace!(?report_type, data_len = data.len(), report_len = report.len(), "get_data");

    let filter = CapsFilter::all().report_id(report_id_of(table, report_type, report)?);
    let mut found = 0usize;
    enumerate_caps(
        table,
        report_type,
        report.len(),
        &filter,
        &mut |cap: &FieldCapability| {
            let walked = collect_data(report, cap, |item| {
                if let Some(slot) = data.get_mut(found) {
                    *slot = item;
                }
                found += 1;
            });
            Visit::from_result(walked.map(|()| Visit::Matched))
        },
        usize::MAX,
    )?;

    if found > data.len() {
        return Err(HidpError::BufferTooSmall { required: found });
    }
    Ok(found)
}

/// Upper bound on the number of items [`get_data`] can return. Returns 0 for
/// an invalid table.
pub fn max_data_list_length(table: &CapabilityTable, report_type: ReportType) -> usize {
    trace!(?report_type, "max_data_list_length");

    let mut count = 0usize;
    let _ = enumerate_caps(
        table,
        report_type,
        0,
        &CapsFilter::all(),
        &mut |cap: &FieldCapability| {
            count += if cap.is_range || cap.is_button {
                usize::from(cap.report_count)
            } else {
                1
            };
            Visit::Matched
        },
        usize::MAX,
    );
    count
}
