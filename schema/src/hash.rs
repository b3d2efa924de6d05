//! Deterministic capability table fingerprinting.

use blake3::Hasher;

use crate::{CapabilityTable, CollectionDef, FieldCapability, ReportType};

/// Computes a deterministic fingerprint of a table.
///
/// The hash covers declaration order, so reordering fields or collections
/// changes it. The identity tag is not hashed.
#[must_use]
pub fn table_hash(table: &CapabilityTable) -> u64 {
    let mut hasher = Hasher::new();

    for report_type in ReportType::ALL {
        let layout = table.layout(report_type);
        write_u8(&mut hasher, report_type as u8);
        write_u16(&mut hasher, layout.byte_length);
        write_u32(&mut hasher, layout.fields.len() as u32);
        for field in &layout.fields {
            write_field(&mut hasher, field);
        }
    }

    write_u32(&mut hasher, table.collections().len() as u32);
    for collection in table.collections() {
        write_collection(&mut hasher, collection);
    }

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn write_field(hasher: &mut Hasher, field: &FieldCapability) {
    write_u16(hasher, field.usage_page);
    write_u16(hasher, field.usage_min);
    write_u16(hasher, field.usage_max);
    write_u8(hasher, field.report_id);
    write_u16(hasher, field.link_collection);
    write_u16(hasher, field.link_usage_page);
    write_u16(hasher, field.link_usage);
    write_u16(hasher, field.bit_field);
    write_u8(
        hasher,
        u8::from(field.is_button)
            | u8::from(field.is_range) << 1
            | u8::from(field.is_string_range) << 2
            | u8::from(field.is_designator_range) << 3,
    );
    write_u32(hasher, field.start_bit);
    write_u16(hasher, field.bit_size);
    write_u16(hasher, field.report_count);
    write_u16(hasher, field.start_index);
    write_u16(hasher, field.data_index_min);
    write_u16(hasher, field.data_index_max);
    write_u16(hasher, field.string_min);
    write_u16(hasher, field.string_max);
    write_u16(hasher, field.designator_min);
    write_u16(hasher, field.designator_max);
    write_i32(hasher, field.logical_min);
    write_i32(hasher, field.logical_max);
    write_i32(hasher, field.physical_min);
    write_i32(hasher, field.physical_max);
    write_u32(hasher, field.units);
    write_u32(hasher, field.units_exp);
}

fn write_collection(hasher: &mut Hasher, collection: &CollectionDef) {
    write_u16(hasher, collection.usage_page);
    write_u16(hasher, collection.usage);
    write_u16(hasher, collection.parent);
    write_u8(hasher, collection.collection_type);
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u16(hasher: &mut Hasher, value: u16) {
    hasher.update(&value.to_le_bytes());
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

fn write_i32(hasher: &mut Hasher, value: i32) {
    hasher.update(&value.to_le_bytes());
}
