//! Filtered walk over a report type's field capabilities.

use schema::{CapabilityTable, FieldCapability, ReportId, ReportType, Usage, UsagePage};

use crate::error::{HidpError, HidpResult};

/// Selects which capabilities a walk visits.
///
/// Zero-valued selectors (`usage_page`, `collection`, `usage`, `report_id`)
/// match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapsFilter {
    /// Only button fields.
    pub buttons: bool,
    /// Only value fields.
    pub values: bool,
    /// Matching fields must be value arrays.
    pub array: bool,
    pub usage_page: UsagePage,
    pub collection: u16,
    pub usage: Usage,
    pub report_id: ReportId,
}

impl CapsFilter {
    /// Matches every non-padding field.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            buttons: false,
            values: false,
            array: false,
            usage_page: 0,
            collection: 0,
            usage: 0,
            report_id: 0,
        }
    }

    /// Matches button fields only.
    #[must_use]
    pub const fn buttons() -> Self {
        Self {
            buttons: true,
            ..Self::all()
        }
    }

    /// Matches value fields only.
    #[must_use]
    pub const fn values() -> Self {
        Self {
            values: true,
            ..Self::all()
        }
    }

    /// Requires matching fields to be value arrays.
    #[must_use]
    pub const fn array(mut self) -> Self {
        self.array = true;
        self
    }

    #[must_use]
    pub const fn usage_page(mut self, usage_page: UsagePage) -> Self {
        self.usage_page = usage_page;
        self
    }

    #[must_use]
    pub const fn collection(mut self, collection: u16) -> Self {
        self.collection = collection;
        self
    }

    #[must_use]
    pub const fn usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    #[must_use]
    pub const fn report_id(mut self, report_id: ReportId) -> Self {
        self.report_id = report_id;
        self
    }

    /// Returns `true` if `cap` passes every selector except the report ID.
    #[must_use]
    pub const fn matches(&self, cap: &FieldCapability) -> bool {
        if cap.is_padding() {
            return false;
        }
        if self.buttons && !cap.is_button {
            return false;
        }
        if self.values && cap.is_button {
            return false;
        }
        if self.usage_page != 0 && self.usage_page != cap.usage_page {
            return false;
        }
        if self.collection != 0 && self.collection != cap.link_collection {
            return false;
        }
        self.usage == 0 || cap.contains_usage(self.usage)
    }
}

/// What a visitor did with a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep walking.
    Matched,
    /// Ends the walk early with success. Capabilities after this one are
    /// neither visited nor counted.
    Skipped,
    /// Abort the walk with an error.
    Failed(HidpError),
}

impl Visit {
    /// Folds a fallible visitor step into an outcome.
    #[must_use]
    pub fn from_result(result: HidpResult<Self>) -> Self {
        match result {
            Ok(visit) => visit,
            Err(err) => Self::Failed(err),
        }
    }
}

/// Per-capability callback driven by [`enumerate_caps`].
pub trait CapsVisitor {
    fn visit(&mut self, cap: &FieldCapability) -> Visit;
}

impl<F> CapsVisitor for F
where
    F: FnMut(&FieldCapability) -> Visit,
{
    fn visit(&mut self, cap: &FieldCapability) -> Visit {
        self(cap)
    }
}

/// Validates the table and report length and returns the report type's fields.
///
/// A `report_len` of zero skips the length check.
pub(crate) fn caps_range(
    table: &CapabilityTable,
    report_type: ReportType,
    report_len: usize,
) -> HidpResult<&[FieldCapability]> {
    if !table.is_valid() {
        return Err(HidpError::InvalidPreparsedData);
    }
    let expected = usize::from(table.report_length(report_type));
    if report_len != 0 && report_len != expected {
        return Err(HidpError::InvalidReportLength {
            expected,
            actual: report_len,
        });
    }
    Ok(table.fields(report_type))
}

/// Walks the capabilities of `report_type` in declaration order, visiting each
/// one that passes `filter`.
///
/// At most `capacity` capabilities are visited, but every match is counted.
/// Returns the number of matches.
///
/// # Errors
///
/// - [`HidpError::InvalidPreparsedData`] if the table is untagged.
/// - [`HidpError::InvalidReportLength`] if `report_len` is nonzero and differs
///   from the declared length.
/// - [`HidpError::NotValueArray`] if `filter.array` is set and a matching
///   capability is a range or holds a single element.
/// - Any error a visitor fails with.
/// - [`HidpError::IncompatibleReportId`] if nothing matched but some capability
///   was skipped for carrying a different report ID, else
///   [`HidpError::UsageNotFound`] if nothing matched.
/// - [`HidpError::BufferTooSmall`] with the match count if it exceeds `capacity`.
pub fn enumerate_caps<V>(
    table: &CapabilityTable,
    report_type: ReportType,
    report_len: usize,
    filter: &CapsFilter,
    visitor: &mut V,
    capacity: usize,
) -> HidpResult<usize>
where
    V: CapsVisitor + ?Sized,
{
    let caps = caps_range(table, report_type, report_len)?;
    let mut incompatible = false;
    let mut matches = 0usize;

    for cap in caps {
        if !filter.matches(cap) {
            continue;
        }
        if filter.report_id != 0 && cap.report_id != filter.report_id {
            incompatible = true;
            continue;
        }
        if filter.array && (cap.is_range || cap.report_count <= 1) {
            return Err(HidpError::NotValueArray);
        }

        matches += 1;
        if matches > capacity {
            continue;
        }
        match visitor.visit(cap) {
            Visit::Matched => {}
            Visit::Skipped => break,
            Visit::Failed(err) => return Err(err),
        }
    }

    if matches == 0 {
        return Err(if incompatible {
            HidpError::IncompatibleReportId
        } else {
            HidpError::UsageNotFound
        });
    }
    if matches > capacity {
        return Err(HidpError::BufferTooSmall { required: matches });
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{CollectionDef, TABLE_MAGIC};

    fn table() -> CapabilityTable {
        CapabilityTable::builder()
            .collection(CollectionDef::root(0x01, 0x05))
            .collection(CollectionDef::child(0, 0x01, 0x01, CollectionDef::PHYSICAL))
            .report_length(ReportType::Input, 5)
            .field(
                ReportType::Input,
                FieldCapability::padding(4, 1).at(8).report_id(1),
            )
            .field(
                ReportType::Input,
                FieldCapability::buttons(0x09, 1, 4).at(12).report_id(1),
            )
            .field(
                ReportType::Input,
                FieldCapability::value(0x01, 0x30, 8)
                    .at(16)
                    .report_id(1)
                    .collection(1, 0x01, 0x01),
            )
            .field(
                ReportType::Input,
                FieldCapability::value(0x01, 0x31, 8).at(24).report_id(1),
            )
            .field(
                ReportType::Input,
                FieldCapability::value(0x01, 0x32, 8).at(32).report_id(2),
            )
            .build()
            .unwrap()
    }

    fn count_visits(filter: &CapsFilter, capacity: usize) -> (HidpResult<usize>, usize) {
        let mut visited = 0;
        let result = enumerate_caps(
            &table(),
            ReportType::Input,
            0,
            filter,
            &mut |_: &FieldCapability| {
                visited += 1;
                Visit::Matched
            },
            capacity,
        );
        (result, visited)
    }

    #[test]
    fn walks_in_declaration_order_skipping_padding() {
        let mut usages = Vec::new();
        let result = enumerate_caps(
            &table(),
            ReportType::Input,
            5,
            &CapsFilter::all(),
            &mut |cap: &FieldCapability| {
                usages.push(cap.usage_min);
                Visit::Matched
            },
            usize::MAX,
        );
        assert_eq!(result, Ok(4));
        assert_eq!(usages, vec![1, 0x30, 0x31, 0x32]);
    }

    #[test]
    fn kind_filters() {
        assert_eq!(count_visits(&CapsFilter::buttons(), 10), (Ok(1), 1));
        assert_eq!(count_visits(&CapsFilter::values(), 10), (Ok(3), 3));
    }

    #[test]
    fn selector_filters() {
        let filter = CapsFilter::values().collection(1);
        assert_eq!(count_visits(&filter, 10), (Ok(1), 1));

        let filter = CapsFilter::buttons().usage_page(0x09).usage(3);
        assert_eq!(count_visits(&filter, 10), (Ok(1), 1));

        let filter = CapsFilter::buttons().usage(5);
        assert_eq!(
            count_visits(&filter, 10),
            (Err(HidpError::UsageNotFound), 0)
        );
    }

    #[test]
    fn capacity_limits_visits_but_counts_matches() {
        let (result, visited) = count_visits(&CapsFilter::values(), 0);
        assert_eq!(result, Err(HidpError::BufferTooSmall { required: 3 }));
        assert_eq!(visited, 0);

        let (result, visited) = count_visits(&CapsFilter::values(), 2);
        assert_eq!(result, Err(HidpError::BufferTooSmall { required: 3 }));
        assert_eq!(visited, 2);
    }

    #[test]
    fn report_id_mismatch_is_incompatible() {
        let filter = CapsFilter::values().usage(0x32).report_id(1);
        assert_eq!(
            count_visits(&filter, 1),
            (Err(HidpError::IncompatibleReportId), 0)
        );

        let filter = CapsFilter::values().report_id(2);
        assert_eq!(count_visits(&filter, 1), (Ok(1), 1));
    }

    fn skip_first(filter: &CapsFilter, capacity: usize) -> (HidpResult<usize>, usize) {
        let mut visited = 0;
        let result = enumerate_caps(
            &table(),
            ReportType::Input,
            0,
            filter,
            &mut |_: &FieldCapability| {
                visited += 1;
                Visit::Skipped
            },
            capacity,
        );
        (result, visited)
    }

    #[test]
    fn skipped_ends_walk_early_with_success() {
        assert_eq!(skip_first(&CapsFilter::all(), usize::MAX), (Ok(1), 1));
    }

    #[test]
    fn skipped_leaves_later_matches_uncounted() {
        // Three value fields match, but the walk ends at the first one, so the
        // capacity of one is never exceeded.
        assert_eq!(skip_first(&CapsFilter::values(), 1), (Ok(1), 1));
        assert_eq!(
            count_visits(&CapsFilter::values(), 1),
            (Err(HidpError::BufferTooSmall { required: 3 }), 1)
        );
    }

    #[test]
    fn failed_aborts_walk() {
        let result = enumerate_caps(
            &table(),
            ReportType::Input,
            0,
            &CapsFilter::all(),
            &mut |_: &FieldCapability| Visit::Failed(HidpError::ValueOutOfRange),
            usize::MAX,
        );
        assert_eq!(result, Err(HidpError::ValueOutOfRange));
    }

    #[test]
    fn array_filter_rejects_scalar_fields() {
        let filter = CapsFilter::values().array().usage(0x30);
        assert_eq!(count_visits(&filter, 1), (Err(HidpError::NotValueArray), 0));
    }

    #[test]
    fn report_length_must_match() {
        let result = enumerate_caps(
            &table(),
            ReportType::Input,
            4,
            &CapsFilter::all(),
            &mut |_: &FieldCapability| Visit::Matched,
            usize::MAX,
        );
        assert_eq!(
            result,
            Err(HidpError::InvalidReportLength {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn untagged_table_is_rejected() {
        let built = table();
        let untagged = CapabilityTable::from_parts(
            TABLE_MAGIC ^ 1,
            [
                built.layout(ReportType::Input).clone(),
                built.layout(ReportType::Output).clone(),
                built.layout(ReportType::Feature).clone(),
            ],
            built.collections().to_vec(),
        );
        let result = enumerate_caps(
            &untagged,
            ReportType::Input,
            0,
            &CapsFilter::all(),
            &mut |_: &FieldCapability| Visit::Matched,
            usize::MAX,
        );
        assert_eq!(result, Err(HidpError::InvalidPreparsedData));
    }

    #[test]
    fn empty_report_type_is_not_found() {
        let result = enumerate_caps(
            &table(),
            ReportType::Feature,
            0,
            &CapsFilter::all(),
            &mut |_: &FieldCapability| Visit::Matched,
            usize::MAX,
        );
        assert_eq!(result, Err(HidpError::UsageNotFound));
    }
}
