//! Scalar and array value access, with logical/physical scaling.
//!
//! Scalar fields are decoded into a 32-bit register. Fields with a negative
//! logical minimum are two's complement and are sign-extended from their
//! element width. Scaling maps the logical range onto the physical range
//! proportionally, rounding to nearest with ties away from zero.

use schema::{CapabilityTable, FieldCapability, ReportType, Usage, UsagePage};
use tracing::trace;

use crate::enumerate::{enumerate_caps, CapsFilter, Visit};
use crate::error::{HidpError, HidpResult};
use crate::report::{extract_image, extract_register, insert_image, insert_register, report_id_of};

/// Interprets a decoded register according to the field's signedness.
#[must_use]
pub const fn sign_extend_field(raw: u32, cap: &FieldCapability) -> i32 {
    if cap.logical_min >= 0 {
        return raw as i32;
    }
    bitstream::sign_extend(raw, cap.bit_size as u32)
}

fn check_ranges(cap: &FieldCapability) -> HidpResult<()> {
    if cap.logical_min > cap.logical_max || cap.physical_min > cap.physical_max {
        return Err(HidpError::BadLogPhyValues);
    }
    Ok(())
}

const fn has_physical_range(cap: &FieldCapability) -> bool {
    cap.physical_min != 0 || cap.physical_max != 0
}

/// Multiplies then divides, rounding half away from zero. `divisor` must be
/// positive.
fn mul_div(value: i64, multiplier: i64, divisor: i64) -> i128 {
    let product = i128::from(value) * i128::from(multiplier);
    let half = i128::from(divisor / 2);
    let rounded = if product >= 0 {
        product + half
    } else {
        product - half
    };
    rounded / i128::from(divisor)
}

/// Maps `value` from `from` onto `to`, both given as `(min, max)`.
fn interpolate(value: i32, from: (i32, i32), to: (i32, i32)) -> HidpResult<i32> {
    let span = i64::from(from.1) - i64::from(from.0);
    if span == 0 {
        return Ok(to.0);
    }
    let offset = mul_div(
        i64::from(value) - i64::from(from.0),
        i64::from(to.1) - i64::from(to.0),
        span,
    );
    i32::try_from(i128::from(to.0) + offset).map_err(|_| HidpError::ValueOutOfRange)
}

/// Maps a signed logical value proportionally onto `target`, given as
/// `(min, max)`.
///
/// # Errors
///
/// [`HidpError::BadLogPhyValues`] if the logical range or `target` is
/// inverted, and [`HidpError::ValueOutOfRange`] if `value` is outside the
/// logical range.
pub fn scale_to(value: i32, cap: &FieldCapability, target: (i32, i32)) -> HidpResult<i32> {
    if cap.logical_min > cap.logical_max || target.0 > target.1 {
        return Err(HidpError::BadLogPhyValues);
    }
    if value < cap.logical_min || value > cap.logical_max {
        return Err(HidpError::ValueOutOfRange);
    }
    interpolate(value, (cap.logical_min, cap.logical_max), target)
}

/// Converts a signed logical value to its physical value.
///
/// This is [`scale_to`] with the field's own physical range as the target.
/// Fields without a physical range (both bounds zero) return `value` unchanged.
///
/// # Errors
///
/// [`HidpError::BadLogPhyValues`] for inverted ranges and
/// [`HidpError::ValueOutOfRange`] if `value` is outside the logical range.
pub fn scale(value: i32, cap: &FieldCapability) -> HidpResult<i32> {
    check_ranges(cap)?;
    if has_physical_range(cap) {
        return scale_to(value, cap, (cap.physical_min, cap.physical_max));
    }
    if value < cap.logical_min || value > cap.logical_max {
        return Err(HidpError::ValueOutOfRange);
    }
    Ok(value)
}

/// Converts a physical value back to its signed logical value.
///
/// Fields without a physical range treat `value` as logical.
///
/// # Errors
///
/// [`HidpError::BadLogPhyValues`] for inverted ranges and
/// [`HidpError::ValueOutOfRange`] if `value` is outside the physical (or,
/// without one, logical) range.
pub fn unscale(value: i32, cap: &FieldCapability) -> HidpResult<i32> {
    check_ranges(cap)?;
    if !has_physical_range(cap) {
        if value < cap.logical_min || value > cap.logical_max {
            return Err(HidpError::ValueOutOfRange);
        }
        return Ok(value);
    }
    if value < cap.physical_min || value > cap.physical_max {
        return Err(HidpError::ValueOutOfRange);
    }
    interpolate(
        value,
        (cap.physical_min, cap.physical_max),
        (cap.logical_min, cap.logical_max),
    )
}

fn value_filter(usage_page: UsagePage, collection: u16, usage: Usage) -> CapsFilter {
    CapsFilter::values()
        .usage_page(usage_page)
        .collection(collection)
        .usage(usage)
}

/// Reads the raw, unscaled value of a value usage.
///
/// # Errors
///
/// [`HidpError::InvalidReportLength`] for an empty or mis-sized report,
/// [`HidpError::BufferTooSmall`] if the field is wider than 32 bits, and the
/// not-found errors of [`enumerate_caps`].
pub fn get_usage_value(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usage: Usage,
    report: &[u8],
) -> HidpResult<u32> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage,
        report_len = report.len(),
        "get_usage_value"
    );

    let filter = value_filter(usage_page, collection, usage)
        .report_id(report_id_of(table, report_type, report)?);
    let mut value = 0;
    enumerate_caps(
        table,
        report_type,
        report.len(),
        &filter,
        &mut |cap: &FieldCapability| {
            Visit::from_result(extract_register(report, cap).map(|raw| {
                value = raw;
                Visit::Skipped
            }))
        },
        1,
    )?;
    Ok(value)
}

/// Reads a value usage, sign-extends it and scales it to its physical range.
///
/// # Errors
///
/// Those of [`get_usage_value`], plus [`HidpError::BadLogPhyValues`] and
/// [`HidpError::ValueOutOfRange`].
pub fn get_scaled_usage_value(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usage: Usage,
    report: &[u8],
) -> HidpResult<i32> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage,
        report_len = report.len(),
        "get_scaled_usage_value"
    );

    let filter = value_filter(usage_page, collection, usage)
        .report_id(report_id_of(table, report_type, report)?);
    let mut value = 0;
    enumerate_caps(
        table,
        report_type,
        report.len(),
        &filter,
        &mut |cap: &FieldCapability| {
            let scaled = extract_register(report, cap)
                .and_then(|raw| scale(sign_extend_field(raw, cap), cap));
            Visit::from_result(scaled.map(|scaled| {
                value = scaled;
                Visit::Skipped
            }))
        },
        1,
    )?;
    Ok(value)
}

/// Copies the raw bit image of a value array into `values`.
///
/// Bytes of `values` past the image are zeroed.
///
/// # Errors
///
/// Those of [`get_usage_value`], [`HidpError::NotValueArray`] if the usage
/// is not a multi-element value field, and [`HidpError::BufferTooSmall`] if
/// `values` cannot hold the image.
pub fn get_usage_value_array(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usage: Usage,
    report: &[u8],
    values: &mut [u8],
) -> HidpResult<()> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage,
        values_len = values.len(),
        report_len = report.len(),
        "get_usage_value_array"
    );

    let filter = value_filter(usage_page, collection, usage)
        .array()
        .report_id(report_id_of(table, report_type, report)?);
    enumerate_caps(
        table,
        report_type,
        report.len(),
        &filter,
        &mut |cap: &FieldCapability| {
            Visit::from_result(extract_image(report, cap, values).map(|()| Visit::Skipped))
        },
        1,
    )?;
    Ok(())
}

/// Writes the raw value of a value usage. Bits of `value` above the field
/// width are dropped.
///
/// # Errors
///
/// Those of [`get_usage_value`].
pub fn set_usage_value(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usage: Usage,
    value: u32,
    report: &mut [u8],
) -> HidpResult<()> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage,
        value,
        report_len = report.len(),
        "set_usage_value"
    );

    let filter = value_filter(usage_page, collection, usage)
        .report_id(report_id_of(table, report_type, report)?);
    let report_len = report.len();
    enumerate_caps(
        table,
        report_type,
        report_len,
        &filter,
        &mut |cap: &FieldCapability| {
            Visit::from_result(insert_register(report, cap, value).map(|()| Visit::Skipped))
        },
        1,
    )?;
    Ok(())
}

/// Scales a physical value to its logical value and writes it.
///
/// # Errors
///
/// Those of [`get_usage_value`], plus [`HidpError::BadLogPhyValues`] and
/// [`HidpError::ValueOutOfRange`].
pub fn set_scaled_usage_value(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usage: Usage,
    value: i32,
    report: &mut [u8],
) -> HidpResult<()> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage,
        value,
        report_len = report.len(),
        "set_scaled_usage_value"
    );

    let filter = value_filter(usage_page, collection, usage)
        .report_id(report_id_of(table, report_type, report)?);
    let report_len = report.len();
    enumerate_caps(
        table,
        report_type,
        report_len,
        &filter,
        &mut |cap: &FieldCapability| {
            let written = unscale(value, cap).and_then(|logical| {
                insert_register(report, cap, u32::from_ne_bytes(logical.to_ne_bytes()))
            });
            Visit::from_result(written.map(|()| Visit::Skipped))
        },
        1,
    )?;
    Ok(())
}

/// Copies a raw bit image from `values` into a value array.
///
/// # Errors
///
/// Those of [`get_usage_value_array`].
pub fn set_usage_value_array(
    table: &CapabilityTable,
    report_type: ReportType,
    usage_page: UsagePage,
    collection: u16,
    usage: Usage,
    values: &[u8],
    report: &mut [u8],
) -> HidpResult<()> {
    trace!(
        ?report_type,
        usage_page,
        collection,
        usage,
        values_len = values.len(),
        report_len = report.len(),
        "set_usage_value_array"
    );

    let filter = value_filter(usage_page, collection, usage)
        .array()
        .report_id(report_id_of(table, report_type, report)?);
    let report_len = report.len();
    enumerate_caps(
        table,
        report_type,
        report_len,
        &filter,
        &mut |cap: &FieldCapability| {
            Visit::from_result(insert_image(report, cap, values).map(|()| Visit::Skipped))
        },
        1,
    )?;
    Ok(())
}
