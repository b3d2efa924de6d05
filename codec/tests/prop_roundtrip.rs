use codec::{
    get_scaled_usage_value, get_usage_value, get_usages, set_scaled_usage_value, set_usage_value,
    set_usages,
};
use proptest::prelude::*;
use schema::{CapabilityTable, FieldCapability, ReportType};

const PAGE: u16 = 0x01;
const USAGE: u16 = 0x30;
const REPORT_LEN: u16 = 8;

fn signed_field() -> impl Strategy<Value = (u32, u16)> {
    // start bit in the payload, width 2..=32 such that the field fits the report
    (2u16..=32).prop_flat_map(|bits| {
        let max_start = u32::from(REPORT_LEN) * 8 - u32::from(bits);
        (8u32..=max_start, Just(bits))
    })
}

fn logical_range(bits: u16) -> (i32, i32) {
    if bits >= 32 {
        (i32::MIN, i32::MAX)
    } else {
        let half = 1i32 << (bits - 1);
        (-half, half - 1)
    }
}

fn table_with(cap: FieldCapability) -> CapabilityTable {
    CapabilityTable::builder()
        .report_length(ReportType::Feature, REPORT_LEN)
        .field(ReportType::Feature, cap)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn signed_scalar_roundtrip(
        (start, bits) in signed_field(),
        fraction in 0.0f64..=1.0,
        noise in any::<[u8; 8]>(),
    ) {
        let (min, max) = logical_range(bits);
        let cap = FieldCapability::value(PAGE, USAGE, bits).at(start).logical(min, max);
        let table = table_with(cap);

        let span = f64::from(max) - f64::from(min);
        let value = (f64::from(min) + span * fraction).round() as i32;
        let value = value.clamp(min, max);

        let mut report = noise;
        report[0] = 0;
        set_scaled_usage_value(
            &table,
            ReportType::Feature,
            PAGE,
            0,
            USAGE,
            value,
            &mut report,
        )
        .unwrap();
        let read =
            get_scaled_usage_value(&table, ReportType::Feature, PAGE, 0, USAGE, &report).unwrap();
        prop_assert_eq!(read, value);
    }

    #[test]
    fn raw_write_preserves_other_bits(
        (start, bits) in signed_field(),
        value in any::<u32>(),
        noise in any::<[u8; 8]>(),
    ) {
        let cap = FieldCapability::value(PAGE, USAGE, bits).at(start);
        let table = table_with(cap);

        let mut report = noise;
        report[0] = 0;
        let before = report;
        set_usage_value(
            &table,
            ReportType::Feature,
            PAGE,
            0,
            USAGE,
            value,
            &mut report,
        )
        .unwrap();

        let mask = u32::MAX >> (32 - u32::from(bits));
        let read = get_usage_value(&table, ReportType::Feature, PAGE, 0, USAGE, &report).unwrap();
        prop_assert_eq!(read, value & mask);

        let field = u64::from(start)..u64::from(start) + u64::from(bits);
        for bit in 0..u64::from(REPORT_LEN) * 8 {
            if field.contains(&bit) {
                continue;
            }
            let byte = usize::try_from(bit / 8).unwrap();
            let shift = bit % 8;
            prop_assert_eq!(
                (report[byte] >> shift) & 1,
                (before[byte] >> shift) & 1,
                "bit {}",
                bit
            );
        }
    }

    #[test]
    fn bitmap_usages_roundtrip(pressed in proptest::collection::btree_set(1u16..=40, 0..12)) {
        let table = CapabilityTable::builder()
            .report_length(ReportType::Input, 6)
            .field(
                ReportType::Input,
                FieldCapability::buttons(0x09, 1, 40).at(8),
            )
            .build()
            .unwrap();

        let usages: Vec<u16> = pressed.iter().copied().collect();
        let mut report = [0u8; 6];
        set_usages(&table, ReportType::Input, 0x09, 0, &usages, &mut report).unwrap();

        let mut out = [0u16; 40];
        let count = get_usages(&table, ReportType::Input, 0x09, 0, &report, &mut out).unwrap();
        prop_assert_eq!(&out[..count], usages.as_slice());
    }
}
