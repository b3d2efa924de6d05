//! Button usage lists.
//!
//! Bitmap fields carry one bit per usage. Array fields carry `report_count`
//! selector slots, where a nonzero selector `v` denotes usage
//! `usage_min + v - start_index`.

use schema::{CapabilityTable, FieldCapability, ReportType, Usage, UsagePage};
use tracing::trace;

use crate::enumerate::{enumerate_caps, CapsFilter, Visit};
use crate::error::{HidpError, HidpResult};
use crate::report::{read_flag, read_slot, report_id_of, set_flag, write_slot};

/// A usage qualified by its page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UsageAndPage {
    pub usage: Usage,
    pub usage_page: UsagePage,
}

/// Calls `emit` with the offset from `usage_min` of every active usage of a
/// button field, in report order.
pub(crate) fn for_each_active(
    report: &[u8],
    cap: &FieldCapability,
    mut emit: impl FnMut(u16),
) -> HidpResult<()> {
    if cap.is_array() {
        if cap.bit_size == 0 {
            return Ok(());
        }
        for slot in 0..cap.report_count {
            let selector = read_slot(report, cap, slot)?;
            if selector != 0 {
                // Usage arithmetic is 16-bit.
                emit((selector as u16).wrapping_sub(cap.start_index));
            }
        }
        return Ok(());
    }

    for index in 0..=cap.usage_max.wrapping_sub(cap.usage_min) {
        if read_flag(report, cap, index)? {
            emit(index);
        }
    }
    Ok(())
}

fn set_usage(report: &mut [u8], cap: &FieldCapability, usage: Usage) -> HidpResult<Visit> {
    let offset = usage.wrapping_sub(cap.usage_min);
    if !cap.is_array() {
        set_flag(report, cap, offset)?;
        return Ok(Visit::Skipped);
    }

    for slot in 0..cap.report_count {
        if read_slot(report, cap, slot)? == 0 {
            let selector = u32::from(cap.start_index.wrapping_add(offset));
            write_slot(report, cap, slot, selector)?;
            return Ok(Visit::Skipped);
        }
    }
    Err(HidpError::BufferTooSmall {
        required: usize::from(cap.report_count) + 1,
    })
}

/// Lists the active button usages of `usage_page` in a report.
///
/// Returns the number of usages. When `usages` is too short it still holds
/// the first `usages.len()` of them.
///
/// # Errors
///
/// - [`HidpError::InvalidReportLength`] for an empty or mis-sized report.
/// - [`HidpError::BufferTooSmall`] with the total count if `usages` is short.
/// - The not-found errors of [`enumerate_caps`].
pub fn get_usages(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    report: &[u8],
    usages: &mut [Usage],
) -> HidpResult<usize> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usages_len = usages.len(),
        report_len = report.len(),
        "get_usages"
    );

    let filter = CapsFilter::buttons()
        .usage_page(usage_page)
        .collection(collection)
        .report_id(report_id_of(table, report_type, report)?);
    let mut found = 0usize;
    enumerate_caps(
        table,
        report_type,
        report.len(),
        &filter,
        &mut |cap: &FieldCapability| {
            let walked = for_each_active(report, cap, |offset| {
                if let Some(slot) = usages.get_mut(found) {
                    *slot = cap.usage_min.wrapping_add(offset);
                }
                found += 1;
            });
            Visit::from_result(walked.map(|()| Visit::Matched))
        },
        usize::MAX,
    )?;

    if found > usages.len() {
        return Err(HidpError::BufferTooSmall { required: found });
    }
    Ok(found)
}

/// Lists the active button usages of every page in a report.
///
/// # Errors
///
/// Those of [`get_usages`].
pub fn get_usages_ex(
    table: &CapabilityTable,
    report_type: ReportType,
    collection: u16,
    report: &[u8],
    usages: &mut [UsageAndPage],
) -> HidpResult<usize> {
    trace!(
        ?report_type,
        collection,
        usages_len = usages.len(),
        report_len = report.len(),
        "get_usages_ex"
    );

    let filter = CapsFilter::buttons()
        .collection(collection)
        .report_id(report_id_of(table, report_type, report)?);
    let mut found = 0usize;
    enumerate_caps(
        table,
        report_type,
        report.len(),
        &filter,
        &mut |cap: &FieldCapability| {
            let walked = for_each_active(report, cap, |offset| {
                if let Some(slot) = usages.get_mut(found) {
                    *slot = UsageAndPage {
                        usage: cap.usage_min.wrapping_add(offset),
                        usage_page: cap.usage_page,
                    };
                }
                found += 1;
            });
            Visit::from_result(walked.map(|()| Visit::Matched))
        },
        usize::MAX,
    )?;

    if found > usages.len() {
        return Err(HidpError::BufferTooSmall { required: found });
    }
    Ok(found)
}

/// Turns on each usage in `usages`. Zero entries are ignored.
///
/// Each usage goes to the first button field that declares it. Array fields
/// take it in their first empty slot, even if the usage is already present.
/// Usages before a failing one stay written.
///
/// # Errors
///
/// - [`HidpError::InvalidReportLength`] for an empty or mis-sized report.
/// - [`HidpError::BufferTooSmall`] if an array field has no empty slot.
/// - The not-found errors of [`enumerate_caps`].
pub fn set_usages(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usages: &[Usage],
    report: &mut [u8],
) -> HidpResult<()> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage_count = usages.len(),
        report_len = report.len(),
        "set_usages"
    );

    let filter = CapsFilter::buttons()
        .usage_page(usage_page)
        .collection(collection)
        .report_id(report_id_of(table, report_type, report)?);
    let report_len = report.len();

    for &usage in usages.iter().filter(|&&usage| usage != 0) {
        enumerate_caps(
            table,
            report_type,
            report_len,
            &filter.usage(usage),
            &mut |cap: &FieldCapability| Visit::from_result(set_usage(report, cap, usage)),
            1,
        )?;
    }
    Ok(())
}

/// Upper bound on the number of usages [`get_usages`] can return for
/// `usage_page` (zero for any page). Returns 0 for an invalid table.
pub fn max_usage_list_length(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
) -> usize {
    trace!(?report_type, usage_page, "max_usage_list_length");

    let mut count = 0usize;
    let _ = enumerate_caps(
        table,
        report_type,
        0,
        &CapsFilter::buttons().usage_page(usage_page),
        &mut |cap: &FieldCapability| {
            count += usize::from(cap.report_count);
            Visit::Matched
        },
        usize::MAX,
    );
    count
}
