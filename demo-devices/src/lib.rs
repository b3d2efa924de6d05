//! Reference capability tables for a gamepad and a boot keyboard.

use schema::{
    CapabilityTable, CollectionDef, FieldCapability, ReportId, ReportType, Usage, UsagePage,
};

pub const PAGE_GENERIC_DESKTOP: UsagePage = 0x01;
pub const PAGE_SIMULATION: UsagePage = 0x02;
pub const PAGE_KEYBOARD: UsagePage = 0x07;
pub const PAGE_LED: UsagePage = 0x08;
pub const PAGE_BUTTON: UsagePage = 0x09;
pub const PAGE_PID: UsagePage = 0x0F;
pub const PAGE_VENDOR: UsagePage = 0xFF00;

pub const USAGE_POINTER: Usage = 0x01;
pub const USAGE_GAME_PAD: Usage = 0x05;
pub const USAGE_KEYBOARD: Usage = 0x06;
pub const USAGE_X: Usage = 0x30;
pub const USAGE_Y: Usage = 0x31;
pub const USAGE_HAT_SWITCH: Usage = 0x39;
pub const USAGE_RUDDER: Usage = 0xBA;
pub const USAGE_MAGNITUDE: Usage = 0x70;
pub const USAGE_CALIBRATION: Usage = 0x01;

pub const GAMEPAD_INPUT_ID: ReportId = 1;
pub const GAMEPAD_OUTPUT_ID: ReportId = 2;
pub const GAMEPAD_FEATURE_ID: ReportId = 3;

pub const GAMEPAD_BUTTONS: u16 = 10;
pub const KEYBOARD_KEY_SLOTS: u16 = 6;

/// English rotation, degrees.
const UNITS_DEGREES: u32 = 0x14;

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 2] = ["gamepad", "keyboard"];

/// Gamepad with sticks, buttons, a hat switch and a rudder.
///
/// Input report 1 (7 bytes):
///
/// | bits  | field                                           |
/// |-------|-------------------------------------------------|
/// | 8-15  | X, logical 0..255, physical 0..65535            |
/// | 16-23 | Y, logical 0..255                               |
/// | 24-33 | buttons 1..10                                   |
/// | 34-37 | hat switch, logical 0..7, 0..315 degrees, null  |
/// | 38-39 | padding                                         |
/// | 40-55 | rudder, logical -32767..32767, physical ±1000   |
///
/// Output report 2 carries two 8-bit rumble magnitudes; feature report 3 a
/// four-byte vendor calibration array.
pub fn gamepad() -> CapabilityTable {
    let pointer = |cap: FieldCapability| cap.collection(1, PAGE_GENERIC_DESKTOP, USAGE_POINTER);

    CapabilityTable::builder()
        .collection(CollectionDef::root(PAGE_GENERIC_DESKTOP, USAGE_GAME_PAD))
        .collection(CollectionDef::child(
            0,
            PAGE_GENERIC_DESKTOP,
            USAGE_POINTER,
            CollectionDef::PHYSICAL,
        ))
        .report_length(ReportType::Input, 7)
        .field(
            ReportType::Input,
            pointer(FieldCapability::value(PAGE_GENERIC_DESKTOP, USAGE_X, 8))
                .at(8)
                .report_id(GAMEPAD_INPUT_ID)
                .physical(0, 65535)
                .data_index(0),
        )
        .field(
            ReportType::Input,
            pointer(FieldCapability::value(PAGE_GENERIC_DESKTOP, USAGE_Y, 8))
                .at(16)
                .report_id(GAMEPAD_INPUT_ID)
                .data_index(1),
        )
        .field(
            ReportType::Input,
            FieldCapability::buttons(PAGE_BUTTON, 1, GAMEPAD_BUTTONS)
                .at(24)
                .report_id(GAMEPAD_INPUT_ID)
                .data_index(2),
        )
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_GENERIC_DESKTOP, USAGE_HAT_SWITCH, 4)
                .at(34)
                .report_id(GAMEPAD_INPUT_ID)
                .logical(0, 7)
                .physical(0, 315)
                .units(UNITS_DEGREES, 0)
                .null_state()
                .data_index(12),
        )
        .field(
            ReportType::Input,
            FieldCapability::padding(2, 1)
                .at(38)
                .report_id(GAMEPAD_INPUT_ID),
        )
        .field(
            ReportType::Input,
            FieldCapability::value(PAGE_SIMULATION, USAGE_RUDDER, 16)
                .at(40)
                .report_id(GAMEPAD_INPUT_ID)
                .logical(-32767, 32767)
                .physical(-1000, 1000)
                .data_index(13),
        )
        .report_length(ReportType::Output, 3)
        .field(
            ReportType::Output,
            FieldCapability::value(PAGE_PID, USAGE_MAGNITUDE, 8)
                .at(8)
                .report_id(GAMEPAD_OUTPUT_ID)
                .report_count(2)
                .data_index(0),
        )
        .report_length(ReportType::Feature, 5)
        .field(
            ReportType::Feature,
            FieldCapability::value(PAGE_VENDOR, USAGE_CALIBRATION, 8)
                .at(8)
                .report_id(GAMEPAD_FEATURE_ID)
                .report_count(4)
                .data_index(0),
        )
        .build()
        .expect("gamepad table must be valid")
}

/// Boot keyboard without report IDs.
///
/// Input (9 bytes): modifier bitmap 0xE0..0xE7 at byte 1, a reserved byte,
/// then six 8-bit key slots whose selector is the key usage itself. Output
/// (2 bytes): five LEDs.
pub fn keyboard() -> CapabilityTable {
    CapabilityTable::builder()
        .collection(CollectionDef::root(PAGE_GENERIC_DESKTOP, USAGE_KEYBOARD))
        .report_length(ReportType::Input, 9)
        .field(
            ReportType::Input,
            FieldCapability::buttons(PAGE_KEYBOARD, 0xE0, 0xE7)
                .at(8)
                .data_index(0),
        )
        .field(ReportType::Input, FieldCapability::padding(8, 1).at(16))
        .field(
            ReportType::Input,
            FieldCapability::button_array(PAGE_KEYBOARD, 0x00, 0x65, KEYBOARD_KEY_SLOTS, 8)
                .at(24)
                .start_index(0)
                .logical(0, 0x65)
                .data_index(8),
        )
        .report_length(ReportType::Output, 2)
        .field(
            ReportType::Output,
            FieldCapability::buttons(PAGE_LED, 1, 5).at(8).data_index(0),
        )
        .field(ReportType::Output, FieldCapability::padding(3, 1).at(13))
        .build()
        .expect("keyboard table must be valid")
}

/// Looks up a reference table by name.
pub fn by_name(name: &str) -> Option<CapabilityTable> {
    match name {
        "gamepad" => Some(gamepad()),
        "keyboard" => Some(keyboard()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_tables_validate() {
        for name in NAMES {
            let table = by_name(name).unwrap();
            table.validate().unwrap();
        }
        assert!(by_name("joystick").is_none());
    }

    #[test]
    fn gamepad_layout() {
        let table = gamepad();
        assert_eq!(
            table.top_level_usage(),
            (PAGE_GENERIC_DESKTOP, USAGE_GAME_PAD)
        );
        assert_eq!(table.report_length(ReportType::Input), 7);
        assert_eq!(table.fields(ReportType::Input).len(), 6);
        assert_eq!(table.collections().len(), 2);
    }

    #[test]
    fn keyboard_has_no_report_ids() {
        let table = keyboard();
        for report_type in ReportType::ALL {
            for cap in table.fields(report_type) {
                assert_eq!(cap.report_id, 0);
            }
        }
    }
}
