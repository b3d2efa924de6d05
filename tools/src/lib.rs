//! Inspection and debugging tools for hidp capability tables and reports.
//!
//! This crate provides utilities for understanding what a table declares and
//! what a captured report carries:
//!
//! - Load and validate capability tables from JSON or the built-in demos
//! - Summarize button/value capabilities and the collection tree
//! - Decode a report into active usages, values and data items
//! - Build an initialized report for a report ID
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use codec::{
    get_button_caps, get_caps, get_data, get_link_collection_nodes, get_scaled_usage_value,
    get_usage_value, get_usage_value_array, get_usages_ex, get_value_caps, initialize_report_for_id,
    max_data_list_length, max_usage_list_length, ButtonCaps, CapsRange, CollectionNode, DataItem,
    DataValue, HidpError, HidpResult, UsageAndPage, ValueCaps,
};
use glob::Pattern;
use schema::{table_hash, CapabilityTable, ReportId, ReportType, Usage, UsagePage};
use serde::Serialize;
use tracing::debug;

/// Table sources starting with this prefix name a built-in demo table.
pub const DEMO_PREFIX: &str = "demo:";

/// Loads a table from `demo:<name>` or a JSON file path.
pub fn load_table(source: &str) -> Result<CapabilityTable> {
    if let Some(name) = source.strip_prefix(DEMO_PREFIX) {
        return demo_devices::by_name(name).ok_or_else(|| {
            anyhow!(
                "unknown demo table {name:?} (expected one of: {})",
                demo_devices::NAMES.join(", ")
            )
        });
    }
    load_table_file(Path::new(source))
}

/// Reads and validates a JSON table file.
pub fn load_table_file(path: &Path) -> Result<CapabilityTable> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read table {}", path.display()))?;
    parse_table_json(&contents)
}

/// Parses and validates a JSON table.
pub fn parse_table_json(json: &str) -> Result<CapabilityTable> {
    let table: CapabilityTable = serde_json::from_str(json).context("parse table json")?;
    table.validate().context("table validation failed")?;
    debug!(hash = table_hash(&table), "loaded table");
    Ok(table)
}

/// One linked collection node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub index: usize,
    pub usage_page: UsagePage,
    pub usage: Usage,
    pub parent: u16,
    pub collection_type: u8,
    pub child_count: u16,
    pub first_child: u16,
    pub next_sibling: u16,
}

/// A usage range with its data indices. Single usages have `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSpan {
    pub usage_min: Usage,
    pub usage_max: Usage,
    pub data_index_min: u16,
    pub data_index_max: u16,
}

impl From<CapsRange> for UsageSpan {
    fn from(range: CapsRange) -> Self {
        match range {
            CapsRange::Single { usage, data_index } => Self {
                usage_min: usage,
                usage_max: usage,
                data_index_min: data_index,
                data_index_max: data_index,
            },
            CapsRange::Range {
                usage_min,
                usage_max,
                data_index_min,
                data_index_max,
            } => Self {
                usage_min,
                usage_max,
                data_index_min,
                data_index_max,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonSummary {
    pub usage_page: UsagePage,
    pub report_id: ReportId,
    pub link_collection: u16,
    pub usages: UsageSpan,
    pub is_absolute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueSummary {
    pub usage_page: UsagePage,
    pub report_id: ReportId,
    pub link_collection: u16,
    pub usages: UsageSpan,
    pub bit_size: u16,
    pub report_count: u16,
    pub logical: (i32, i32),
    pub physical: (i32, i32),
    pub has_null: bool,
    pub units: u32,
    pub units_exp: u32,
}

/// Capabilities of one report type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub report_type: ReportType,
    pub byte_length: u16,
    pub data_indices: u16,
    pub buttons: Vec<ButtonSummary>,
    pub values: Vec<ValueSummary>,
}

/// Everything a table declares, as reported by the query API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapsReport {
    pub table_hash: u64,
    pub usage_page: UsagePage,
    pub usage: Usage,
    pub collections: Vec<CollectionSummary>,
    pub reports: Vec<ReportSummary>,
}

/// Summarizes a table through the capability queries.
pub fn inspect_caps(table: &CapabilityTable) -> Result<CapsReport> {
    let caps = get_caps(table)?;

    let mut nodes = vec![CollectionNode::default(); usize::from(caps.link_collection_nodes)];
    if !nodes.is_empty() {
        get_link_collection_nodes(table, &mut nodes)?;
    }
    let collections = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| CollectionSummary {
            index,
            usage_page: node.usage_page,
            usage: node.usage,
            parent: node.parent,
            collection_type: node.collection_type,
            child_count: node.child_count,
            first_child: node.first_child,
            next_sibling: node.next_sibling,
        })
        .collect();

    let mut reports = Vec::new();
    for report_type in ReportType::ALL {
        let report = caps.report(report_type);
        if report.byte_length == 0 {
            continue;
        }
        let button_count = usize::from(report.button_caps);
        let buttons = fill(button_count, |out| get_button_caps(table, report_type, out))?;
        let value_count = usize::from(report.value_caps);
        let values = fill(value_count, |out| get_value_caps(table, report_type, out))?;
        reports.push(ReportSummary {
            report_type,
            byte_length: report.byte_length,
            data_indices: report.data_indices,
            buttons: buttons.iter().map(button_summary).collect(),
            values: values.iter().map(value_summary).collect(),
        });
    }

    Ok(CapsReport {
        table_hash: table_hash(table),
        usage_page: caps.usage_page,
        usage: caps.usage,
        collections,
        reports,
    })
}

fn button_summary(caps: &ButtonCaps) -> ButtonSummary {
    ButtonSummary {
        usage_page: caps.usage_page,
        report_id: caps.report_id,
        link_collection: caps.link_collection,
        usages: caps.usages.into(),
        is_absolute: caps.is_absolute,
    }
}

fn value_summary(caps: &ValueCaps) -> ValueSummary {
    ValueSummary {
        usage_page: caps.usage_page,
        report_id: caps.report_id,
        link_collection: caps.link_collection,
        usages: caps.usages.into(),
        bit_size: caps.bit_size,
        report_count: caps.report_count,
        logical: (caps.logical_min, caps.logical_max),
        physical: (caps.physical_min, caps.physical_max),
        has_null: caps.has_null,
        units: caps.units,
        units_exp: caps.units_exp,
    }
}

/// Runs a slice-filling query with exactly `count` slots.
fn fill<T, F>(count: usize, query: F) -> HidpResult<Vec<T>>
where
    T: Default + Clone,
    F: FnOnce(&mut [T]) -> HidpResult<usize>,
{
    let mut items = vec![T::default(); count];
    if count > 0 {
        let written = query(&mut items)?;
        items.truncate(written);
    }
    Ok(items)
}

/// Maps "nothing in this report" outcomes to an empty result.
fn absent_as_empty(result: HidpResult<usize>) -> HidpResult<usize> {
    match result {
        Err(HidpError::UsageNotFound | HidpError::IncompatibleReportId) => Ok(0),
        other => other,
    }
}

/// A decoded value usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedValue {
    pub usage_page: UsagePage,
    pub usage: Usage,
    pub collection: u16,
    /// Raw register contents for single-element fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<u32>,
    /// Physical value, absent when out of range or not scalable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled: Option<i32>,
    /// Bit image of multi-element value fields, hex encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array: Option<String>,
}

/// One entry of the generic data list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedData {
    pub data_index: u16,
    /// `None` for a pressed button.
    pub value: Option<u32>,
}

impl From<DataItem> for DecodedData {
    fn from(item: DataItem) -> Self {
        Self {
            data_index: item.data_index,
            value: match item.value {
                DataValue::On => None,
                DataValue::Raw(raw) => Some(raw),
            },
        }
    }
}

/// What a report buffer carries according to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedReport {
    pub report_type: ReportType,
    pub report_id: ReportId,
    pub byte_length: usize,
    pub usages: Vec<(UsagePage, Usage)>,
    pub values: Vec<DecodedValue>,
    pub data: Vec<DecodedData>,
}

/// Decodes every usage, value and data item present in `report`.
pub fn decode_report(
    table: &CapabilityTable,
    report_type: ReportType,
    report: &[u8],
) -> Result<DecodedReport> {
    let expected = usize::from(table.report_length(report_type));
    if expected == 0 {
        bail!("table declares no {report_type:?} report");
    }
    if report.len() != expected {
        return Err(HidpError::InvalidReportLength {
            expected,
            actual: report.len(),
        })
        .context("report length");
    }
    let report_id = report[0];

    let mut usages = vec![UsageAndPage::default(); max_usage_list_length(table, report_type, 0)];
    let count = absent_as_empty(get_usages_ex(table, report_type, 0, report, &mut usages))?;
    usages.truncate(count);

    let mut data = vec![DataItem::default(); max_data_list_length(table, report_type)];
    let count = absent_as_empty(get_data(table, report_type, report, &mut data))?;
    data.truncate(count);

    let value_count = usize::from(get_caps(table)?.report(report_type).value_caps);
    let caps = fill(value_count, |out| get_value_caps(table, report_type, out))?;
    let mut values = Vec::new();
    for cap in &caps {
        if cap.report_id != 0 && cap.report_id != report_id {
            continue;
        }
        let span = UsageSpan::from(cap.usages);
        for usage in span.usage_min..=span.usage_max {
            values.push(decode_value(table, report_type, cap, usage, report)?);
        }
    }

    Ok(DecodedReport {
        report_type,
        report_id,
        byte_length: report.len(),
        usages: usages.iter().map(|u| (u.usage_page, u.usage)).collect(),
        values,
        data: data.into_iter().map(DecodedData::from).collect(),
    })
}

fn decode_value(
    table: &CapabilityTable,
    report_type: ReportType,
    cap: &ValueCaps,
    usage: Usage,
    report: &[u8],
) -> Result<DecodedValue> {
    let page = cap.usage_page;
    let collection = cap.link_collection;
    let mut decoded = DecodedValue {
        usage_page: page,
        usage,
        collection,
        raw: None,
        scaled: None,
        array: None,
    };

    let is_array = matches!(cap.usages, CapsRange::Single { .. }) && cap.report_count > 1;
    if is_array {
        let bits = usize::from(cap.bit_size) * usize::from(cap.report_count);
        let mut image = vec![0u8; bits.div_ceil(8)];
        get_usage_value_array(
            table,
            report_type,
            page,
            collection,
            usage,
            report,
            &mut image,
        )?;
        decoded.array = Some(hex_bytes(&image));
        return Ok(decoded);
    }

    decoded.raw = Some(get_usage_value(table, report_type, page, collection, usage, report)?);
    let scaled = get_scaled_usage_value(table, report_type, page, collection, usage, report);
    decoded.scaled = match scaled {
        Ok(scaled) => Some(scaled),
        Err(HidpError::ValueOutOfRange | HidpError::BadLogPhyValues) => None,
        Err(err) => return Err(err.into()),
    };
    Ok(decoded)
}

/// Returns an all-zero report of `report_type` stamped with `report_id`.
pub fn init_report(
    table: &CapabilityTable,
    report_type: ReportType,
    report_id: ReportId,
) -> Result<Vec<u8>> {
    let length = usize::from(table.report_length(report_type));
    if length == 0 {
        bail!("table declares no {report_type:?} report");
    }
    let mut report = vec![0u8; length];
    initialize_report_for_id(table, report_type, report_id, &mut report)?;
    Ok(report)
}

/// Lowercase hex without separators.
pub fn hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Parses hex bytes, ignoring whitespace.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let byte: String = pair.iter().collect();
            u8::from_str_radix(&byte, 16).with_context(|| format!("invalid hex byte {byte:?}"))
        })
        .collect()
}

/// Report capture files in `dir`, sorted by path, optionally filtered by a
/// glob matched against the path or the file name.
pub fn collect_report_files(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

pub fn format_caps_pretty(report: &CapsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "top-level usage: {:#06x}:{:#06x} table_hash: 0x{:016x}",
        report.usage_page, report.usage, report.table_hash
    );
    if !report.collections.is_empty() {
        let _ = writeln!(out, "collections:");
        for node in &report.collections {
            let _ = writeln!(
                out,
                "  [{}] {:#06x}:{:#06x} type {} parent {} children {}",
                node.index,
                node.usage_page,
                node.usage,
                node.collection_type,
                node.parent,
                node.child_count
            );
        }
    }
    for summary in &report.reports {
        let _ = writeln!(
            out,
            "{:?}: {} bytes, {} data indices",
            summary.report_type, summary.byte_length, summary.data_indices
        );
        for button in &summary.buttons {
            let _ = writeln!(
                out,
                "  button id {} page {:#06x} usages {} collection {}",
                button.report_id,
                button.usage_page,
                format_span(&button.usages),
                button.link_collection
            );
        }
        for value in &summary.values {
            let _ = write!(
                out,
                "  value  id {} page {:#06x} usages {} collection {}",
                value.report_id,
                value.usage_page,
                format_span(&value.usages),
                value.link_collection
            );
            let _ = writeln!(
                out,
                " {}x{} bits logical {}..{} physical {}..{}{}",
                value.report_count,
                value.bit_size,
                value.logical.0,
                value.logical.1,
                value.physical.0,
                value.physical.1,
                if value.has_null { " null" } else { "" }
            );
        }
    }
    out
}

fn format_span(span: &UsageSpan) -> String {
    if span.usage_min == span.usage_max {
        format!("{:#06x} (index {})", span.usage_min, span.data_index_min)
    } else {
        format!(
            "{:#06x}..{:#06x} (index {}..{})",
            span.usage_min, span.usage_max, span.data_index_min, span.data_index_max
        )
    }
}

pub fn format_decode_pretty(report: &DecodedReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:?} report id {} ({} bytes)",
        report.report_type, report.report_id, report.byte_length
    );
    let _ = writeln!(out, "usages:");
    for (page, usage) in &report.usages {
        let _ = writeln!(out, "  {page:#06x}:{usage:#06x}");
    }
    let _ = writeln!(out, "values:");
    for value in &report.values {
        let _ = write!(
            out,
            "  {:#06x}:{:#06x} collection {}",
            value.usage_page, value.usage, value.collection
        );
        if let Some(raw) = value.raw {
            let _ = write!(out, " raw {raw}");
        }
        if let Some(scaled) = value.scaled {
            let _ = write!(out, " scaled {scaled}");
        }
        if let Some(array) = &value.array {
            let _ = write!(out, " array {array}");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "data:");
    for item in &report.data {
        match item.value {
            Some(raw) => {
                let _ = writeln!(out, "  [{}] {raw}", item.data_index);
            }
            None => {
                let _ = writeln!(out, "  [{}] on", item.data_index);
            }
        }
    }
    out
}
