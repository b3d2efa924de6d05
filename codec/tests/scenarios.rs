use codec::{
    get_data, get_link_collection_nodes, get_scaled_usage_value, get_specific_value_caps,
    get_usage_value, get_usages, get_value_caps, set_usage_value, set_usages, CollectionNode,
    DataItem, DataValue, HidpError, ValueCaps,
};
use schema::{CapabilityTable, CollectionDef, FieldCapability, ReportType};

const PAGE_DESKTOP: u16 = 0x01;
const PAGE_BUTTON: u16 = 0x09;
const USAGE_X: u16 = 0x30;

fn scaled_axis_table() -> CapabilityTable {
    CapabilityTable::builder()
        .report_length(ReportType::Input, 2)
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_DESKTOP, USAGE_X, 8)
                .at(8)
                .logical(0, 255)
                .physical(0, 65535),
        )
        .build()
        .unwrap()
}

#[test]
fn scenario_scaled_axis_midpoint() {
    let table = scaled_axis_table();
    let mut report = [0u8; 2];
    set_usage_value(
        &table,
        ReportType::Input,
        PAGE_DESKTOP,
        0,
        USAGE_X,
        128,
        &mut report,
    )
    .unwrap();
    assert_eq!(report, [0, 128]);

    let scaled =
        get_scaled_usage_value(&table, ReportType::Input, PAGE_DESKTOP, 0, USAGE_X, &report)
            .unwrap();
    // 128 * 65535 / 255 == 128 * 257
    assert_eq!(scaled, 32896);
}

#[test]
fn scenario_bitmap_buttons() {
    let table = CapabilityTable::builder()
        .report_length(ReportType::Input, 6)
        .field(
            ReportType::Input,
            FieldCapability::buttons(PAGE_BUTTON, 1, 10)
                .at(32)
                .report_id(1),
        )
        .build()
        .unwrap();

    let mut report = [1, 0, 0, 0, 0, 0];
    report[4] = 0b1000_1000;

    let mut usages = [0u16; 10];
    let count = get_usages(
        &table,
        ReportType::Input,
        PAGE_BUTTON,
        0,
        &report,
        &mut usages,
    )
    .unwrap();
    assert_eq!(&usages[..count], &[4, 8]);
}

#[test]
fn scenario_array_buttons() {
    let table = CapabilityTable::builder()
        .report_length(ReportType::Input, 3)
        .field(
            ReportType::Input,
            FieldCapability::button_array(PAGE_BUTTON, 4, 10, 2, 8).at(8),
        )
        .build()
        .unwrap();

    let mut report = [0u8; 3];
    set_usages(&table, ReportType::Input, PAGE_BUTTON, 0, &[6], &mut report).unwrap();
    assert_eq!(report, [0, 3, 0]);

    let mut usages = [0u16; 2];
    let count = get_usages(
        &table,
        ReportType::Input,
        PAGE_BUTTON,
        0,
        &report,
        &mut usages,
    )
    .unwrap();
    assert_eq!(&usages[..count], &[6]);
}

#[test]
fn scenario_array_usage_set_twice_takes_two_slots() {
    let table = CapabilityTable::builder()
        .report_length(ReportType::Input, 3)
        .field(
            ReportType::Input,
            FieldCapability::button_array(PAGE_BUTTON, 4, 10, 2, 8).at(8),
        )
        .build()
        .unwrap();

    let mut report = [0u8; 3];
    set_usages(&table, ReportType::Input, PAGE_BUTTON, 0, &[6], &mut report).unwrap();
    set_usages(&table, ReportType::Input, PAGE_BUTTON, 0, &[6], &mut report).unwrap();
    assert_eq!(report, [0, 3, 3]);

    let mut usages = [0u16; 2];
    let count = get_usages(
        &table,
        ReportType::Input,
        PAGE_BUTTON,
        0,
        &report,
        &mut usages,
    )
    .unwrap();
    assert_eq!(&usages[..count], &[6, 6]);

    assert_eq!(
        set_usages(&table, ReportType::Input, PAGE_BUTTON, 0, &[6], &mut report),
        Err(HidpError::BufferTooSmall { required: 3 })
    );
}

#[test]
fn scenario_incompatible_report_id() {
    let table = CapabilityTable::builder()
        .report_length(ReportType::Input, 2)
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_DESKTOP, USAGE_X, 8)
                .at(8)
                .report_id(1),
        )
        .build()
        .unwrap();

    let report = [2, 0x55];
    assert_eq!(
        get_usage_value(&table, ReportType::Input, PAGE_DESKTOP, 0, USAGE_X, &report),
        Err(HidpError::IncompatibleReportId)
    );

    let mut caps = [ValueCaps::default(); 1];
    let count = get_specific_value_caps(
        &table,
        ReportType::Input,
        PAGE_DESKTOP,
        0,
        USAGE_X,
        &mut caps,
    )
    .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn scenario_incompatible_writes_nothing() {
    let table = CapabilityTable::builder()
        .report_length(ReportType::Input, 2)
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_DESKTOP, USAGE_X, 8)
                .at(8)
                .report_id(1),
        )
        .build()
        .unwrap();

    let mut report = [2, 0x55];
    assert_eq!(
        set_usage_value(
            &table,
            ReportType::Input,
            PAGE_DESKTOP,
            0,
            USAGE_X,
            7,
            &mut report,
        ),
        Err(HidpError::IncompatibleReportId)
    );
    assert_eq!(report, [2, 0x55]);
}

#[test]
fn scenario_capacity_zero_reports_required() {
    let table = CapabilityTable::builder()
        .report_length(ReportType::Input, 4)
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_DESKTOP, 0x30, 8).at(8),
        )
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_DESKTOP, 0x31, 8).at(16),
        )
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_DESKTOP, 0x32, 8).at(24),
        )
        .build()
        .unwrap();

    assert_eq!(
        get_value_caps(&table, ReportType::Input, &mut []),
        Err(HidpError::BufferTooSmall { required: 3 })
    );

    let mut caps = [ValueCaps::default(); 3];
    assert_eq!(get_value_caps(&table, ReportType::Input, &mut caps), Ok(3));
}

#[test]
fn scenario_neighbouring_fields_survive_writes() {
    let table = CapabilityTable::builder()
        .report_length(ReportType::Output, 3)
        .field(
            ReportType::Output,
            FieldCapability::value(PAGE_DESKTOP, 0x30, 5).at(8),
        )
        .field(
            ReportType::Output,
            FieldCapability::value(PAGE_DESKTOP, 0x31, 7).at(13),
        )
        .field(
            ReportType::Output,
            FieldCapability::value(PAGE_DESKTOP, 0x32, 4).at(20),
        )
        .build()
        .unwrap();

    let mut report = [0u8; 3];
    for (usage, value) in [(0x30, 0x1F), (0x32, 0xA), (0x31, 0x55), (0x31, 0)] {
        set_usage_value(
            &table,
            ReportType::Output,
            PAGE_DESKTOP,
            0,
            usage,
            value,
            &mut report,
        )
        .unwrap();
    }

    for (usage, expected) in [(0x30, 0x1F), (0x31, 0), (0x32, 0xA)] {
        assert_eq!(
            get_usage_value(&table, ReportType::Output, PAGE_DESKTOP, 0, usage, &report),
            Ok(expected)
        );
    }
}

#[test]
fn scenario_get_calls_are_idempotent() {
    let table = scaled_axis_table();
    let report = [0u8, 200];
    let first =
        get_scaled_usage_value(&table, ReportType::Input, PAGE_DESKTOP, 0, USAGE_X, &report);
    let second =
        get_scaled_usage_value(&table, ReportType::Input, PAGE_DESKTOP, 0, USAGE_X, &report);
    assert_eq!(first, second);
    assert_eq!(report, [0, 200]);

    let mut data_a = [DataItem::default(); 2];
    let mut data_b = [DataItem::default(); 2];
    assert_eq!(
        get_data(&table, ReportType::Input, &report, &mut data_a),
        get_data(&table, ReportType::Input, &report, &mut data_b)
    );
    assert_eq!(data_a, data_b);
    assert_eq!(data_a[0].value, DataValue::Raw(200));
}

#[test]
fn scenario_signed_value_out_of_range() {
    let table = CapabilityTable::builder()
        .report_length(ReportType::Input, 2)
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_DESKTOP, USAGE_X, 8)
                .at(8)
                .logical(-100, 100)
                .physical(-10, 10),
        )
        .build()
        .unwrap();

    // 0x80 sign-extends to -128, below the logical minimum.
    assert_eq!(
        get_scaled_usage_value(
            &table,
            ReportType::Input,
            PAGE_DESKTOP,
            0,
            USAGE_X,
            &[0, 0x80],
        ),
        Err(HidpError::ValueOutOfRange)
    );
    assert_eq!(
        get_scaled_usage_value(
            &table,
            ReportType::Input,
            PAGE_DESKTOP,
            0,
            USAGE_X,
            &[0, 0x9C],
        ),
        Ok(-10)
    );
    assert_eq!(
        get_usage_value(
            &table,
            ReportType::Input,
            PAGE_DESKTOP,
            0,
            USAGE_X,
            &[0, 0x80],
        ),
        Ok(0x80)
    );
}

#[test]
fn scenario_bad_log_phy_values() {
    let mut cap = FieldCapability::value(PAGE_DESKTOP, USAGE_X, 8).at(8);
    cap.logical_min = 10;
    cap.logical_max = 0;
    let table = CapabilityTable::builder()
        .report_length(ReportType::Input, 2)
        .field(ReportType::Input, cap)
        .build()
        .unwrap();

    assert_eq!(
        get_scaled_usage_value(&table, ReportType::Input, PAGE_DESKTOP, 0, USAGE_X, &[0, 5]),
        Err(HidpError::BadLogPhyValues)
    );
}

#[test]
fn scenario_collection_siblings_last_declared_first() {
    let table = CapabilityTable::builder()
        .collection(CollectionDef::root(PAGE_DESKTOP, 0x04))
        .collection(CollectionDef::child(0, PAGE_DESKTOP, 0x01, CollectionDef::PHYSICAL))
        .collection(CollectionDef::child(0, PAGE_DESKTOP, 0x02, CollectionDef::PHYSICAL))
        .collection(CollectionDef::child(0, PAGE_DESKTOP, 0x03, CollectionDef::PHYSICAL))
        .build()
        .unwrap();

    let mut nodes = [CollectionNode::default(); 4];
    assert_eq!(get_link_collection_nodes(&table, &mut nodes), Ok(4));

    let mut order = Vec::new();
    let mut child = nodes[0].first_child;
    while child != 0 {
        order.push(nodes[usize::from(child)].usage);
        child = nodes[usize::from(child)].next_sibling;
    }
    assert_eq!(order, vec![0x03, 0x02, 0x01]);
    assert_eq!(nodes[0].child_count, 3);
}
