//! Benchmarks for report decoding queries.

use codec::{get_data, get_scaled_usage_value, get_usages, set_usages, DataItem};
use criterion::{criterion_group, criterion_main, Criterion};
use demo_devices::{
    gamepad, keyboard, GAMEPAD_INPUT_ID, PAGE_BUTTON, PAGE_GENERIC_DESKTOP, PAGE_KEYBOARD,
    PAGE_SIMULATION, USAGE_RUDDER, USAGE_X,
};
use schema::ReportType;
use std::hint::black_box;

fn gamepad_report() -> [u8; 7] {
    [GAMEPAD_INPUT_ID, 0x80, 0x40, 0x55, 0x09, 0x01, 0x80]
}

fn bench_scaled_value(c: &mut Criterion) {
    let table = gamepad();
    let report = gamepad_report();

    c.bench_function("get_scaled_usage_value_axis", |b| {
        b.iter(|| {
            black_box(get_scaled_usage_value(
                &table,
                ReportType::Input,
                PAGE_GENERIC_DESKTOP,
                0,
                black_box(USAGE_X),
                black_box(&report),
            ))
        });
    });

    c.bench_function("get_scaled_usage_value_rudder", |b| {
        b.iter(|| {
            black_box(get_scaled_usage_value(
                &table,
                ReportType::Input,
                PAGE_SIMULATION,
                0,
                black_box(USAGE_RUDDER),
                black_box(&report),
            ))
        });
    });
}

fn bench_usages(c: &mut Criterion) {
    let gamepad = gamepad();
    let report = gamepad_report();
    let mut usages = [0u16; 16];

    c.bench_function("get_usages_bitmap", |b| {
        b.iter(|| {
            black_box(get_usages(
                &gamepad,
                ReportType::Input,
                PAGE_BUTTON,
                0,
                black_box(&report),
                &mut usages,
            ))
        });
    });

    let keyboard = keyboard();
    let mut keys = [0u8; 9];
    set_usages(
        &keyboard,
        ReportType::Input,
        PAGE_KEYBOARD,
        0,
        &[0xE0, 4, 5, 6, 7],
        &mut keys,
    )
    .expect("keyboard report must accept keys");

    c.bench_function("get_usages_array", |b| {
        b.iter(|| {
            black_box(get_usages(
                &keyboard,
                ReportType::Input,
                PAGE_KEYBOARD,
                0,
                black_box(&keys),
                &mut usages,
            ))
        });
    });
}

fn bench_get_data(c: &mut Criterion) {
    let table = gamepad();
    let report = gamepad_report();
    let mut data = [DataItem::default(); 16];

    c.bench_function("get_data_gamepad", |b| {
        b.iter(|| black_box(get_data(&table, ReportType::Input, black_box(&report), &mut data)));
    });
}

criterion_group!(benches, bench_scaled_value, bench_usages, bench_get_data);
criterion_main!(benches);
