#![no_main]

use codec::{
    get_data, get_scaled_usage_value, get_usage_value, get_usages_ex, set_scaled_usage_value,
    set_usages, DataItem, UsageAndPage,
};
use libfuzzer_sys::fuzz_target;
use schema::{CapabilityTable, ReportType};

fn tables() -> [CapabilityTable; 2] {
    [demo_devices::gamepad(), demo_devices::keyboard()]
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }
    let tables = tables();
    let table = &tables[usize::from(data[0] & 1)];
    let report_type = ReportType::ALL[usize::from(data[1] % 3)];
    let page = u16::from(data[2]);
    let usage = u16::from(data[3]);
    let payload = &data[4..];

    // Reads over arbitrary bytes, including mis-sized buffers.
    let _ = get_usage_value(table, report_type, page, 0, usage, payload);
    let _ = get_scaled_usage_value(table, report_type, page, 0, usage, payload);
    let mut usages = [UsageAndPage::default(); 16];
    let _ = get_usages_ex(table, report_type, 0, payload, &mut usages);
    let mut items = [DataItem::default(); 16];
    let _ = get_data(table, report_type, payload, &mut items);

    // Writes into a correctly sized copy must leave the length intact.
    let length = usize::from(table.report_length(report_type));
    if length == 0 {
        return;
    }
    let mut report: Vec<u8> = payload.iter().copied().cycle().take(length).collect();
    let value = i32::from_le_bytes([data[2], data[3], data[4], data[5]]);
    let _ = set_scaled_usage_value(table, report_type, page, 0, usage, value, &mut report);
    let _ = set_usages(table, report_type, page, 0, &[usage], &mut report);
    assert_eq!(report.len(), length);
});
