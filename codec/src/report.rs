//! Report buffer access shared by the query operations.

use bitstream::{copy_bits, BitReader, BitWriter};
use schema::{CapabilityTable, FieldCapability, ReportId, ReportType};
use tracing::trace;

use crate::enumerate::caps_range;
use crate::error::{HidpError, HidpResult};

/// Width in bytes of the register scalar values are decoded into.
pub(crate) const VALUE_REGISTER_BYTES: usize = 4;

/// Returns the report ID held in byte 0 of `report`.
pub(crate) fn report_id_of(
    table: &CapabilityTable,
    report_type: ReportType,
    report: &[u8],
) -> HidpResult<ReportId> {
    report
        .first()
        .copied()
        .ok_or_else(|| HidpError::InvalidReportLength {
            expected: usize::from(table.report_length(report_type)),
            actual: 0,
        })
}

/// Bytes needed to hold the whole bit image of `cap`.
pub(crate) const fn image_bytes(cap: &FieldCapability) -> usize {
    (cap.bit_count() as usize).div_ceil(8)
}

fn start_shift(cap: &FieldCapability) -> HidpResult<isize> {
    isize::try_from(cap.start_bit).map_err(|_| HidpError::InvalidPreparsedData)
}

/// Copies the bit image of `cap` out of `report` into `out`, zeroing the rest.
pub(crate) fn extract_image(
    report: &[u8],
    cap: &FieldCapability,
    out: &mut [u8],
) -> HidpResult<()> {
    let required = image_bytes(cap);
    if required > out.len() {
        return Err(HidpError::BufferTooSmall { required });
    }
    out.fill(0);
    copy_bits(out, report, cap.bit_count() as usize, -start_shift(cap)?)?;
    Ok(())
}

/// Copies the bit image of `cap` from `image` into `report`.
pub(crate) fn insert_image(
    report: &mut [u8],
    cap: &FieldCapability,
    image: &[u8],
) -> HidpResult<()> {
    let required = image_bytes(cap);
    if required > image.len() {
        return Err(HidpError::BufferTooSmall { required });
    }
    copy_bits(report, image, cap.bit_count() as usize, start_shift(cap)?)?;
    Ok(())
}

/// Decodes the full field into an unsigned 32-bit register.
pub(crate) fn extract_register(report: &[u8], cap: &FieldCapability) -> HidpResult<u32> {
    let mut register = [0u8; VALUE_REGISTER_BYTES];
    extract_image(report, cap, &mut register)?;
    Ok(u32::from_le_bytes(register))
}

/// Encodes the low bits of `value` into the full field.
pub(crate) fn insert_register(
    report: &mut [u8],
    cap: &FieldCapability,
    value: u32,
) -> HidpResult<()> {
    insert_image(report, cap, &value.to_le_bytes())
}

fn slot_position(cap: &FieldCapability, slot: u16) -> usize {
    cap.start_bit as usize + usize::from(slot) * usize::from(cap.bit_size)
}

/// Reads the selector held in array slot `slot`.
pub(crate) fn read_slot(report: &[u8], cap: &FieldCapability, slot: u16) -> HidpResult<u32> {
    let mut reader = BitReader::at(report, slot_position(cap, slot))?;
    let selector = reader.read_bits(usize::from(cap.bit_size))?;
    u32::try_from(selector).map_err(|_| HidpError::InvalidPreparsedData)
}

/// Writes `selector` into array slot `slot`, truncated to the slot width.
pub(crate) fn write_slot(
    report: &mut [u8],
    cap: &FieldCapability,
    slot: u16,
    selector: u32,
) -> HidpResult<()> {
    let bits = usize::from(cap.bit_size);
    let mask = if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    };
    let mut writer = BitWriter::at(report, slot_position(cap, slot))?;
    writer.write_bits(u64::from(selector & mask), bits)?;
    Ok(())
}

/// Reads the flag of bitmap element `index`.
pub(crate) fn read_flag(report: &[u8], cap: &FieldCapability, index: u16) -> HidpResult<bool> {
    let mut reader = BitReader::at(report, cap.start_bit as usize + usize::from(index))?;
    Ok(reader.read_bit()?)
}

/// Sets the flag of bitmap element `index`.
pub(crate) fn set_flag(report: &mut [u8], cap: &FieldCapability, index: u16) -> HidpResult<()> {
    let mut writer = BitWriter::at(report, cap.start_bit as usize + usize::from(index))?;
    writer.write_bit(true)?;
    Ok(())
}

/// Clears `report` and stamps `report_id` into byte 0.
///
/// # Errors
///
/// - [`HidpError::InvalidReportLength`] if `report` is empty or differs from
///   the declared length.
/// - [`HidpError::InvalidPreparsedData`] if the table is untagged.
/// - [`HidpError::ReportDoesNotExist`] if no field belongs to `report_id`.
pub fn initialize_report_for_id(
    table: &CapabilityTable,
    report_type: ReportType,
    report_id: ReportId,
    report: &mut [u8],
) -> HidpResult<()> {
    trace!(?report_type, report_id, report_len = report.len(), "initialize_report_for_id");

    if report.is_empty() {
        return Err(HidpError::InvalidReportLength {
            expected: usize::from(table.report_length(report_type)),
            actual: 0,
        });
    }
    let caps = caps_range(table, report_type, report.len())?;
    if !caps
        .iter()
        .any(|cap| cap.report_id == report_id && !cap.is_padding())
    {
        return Err(HidpError::ReportDoesNotExist { report_id });
    }

    report.fill(0);
    report[0] = report_id;
    Ok(())
}
