//! LOC test data reconciliation.
//!
//! The LOC test data sheet is a fixed-width grid addressed by column position,
//! never by header text:
//!
//! | cols | content                                                      |
//! |------|--------------------------------------------------------------|
//! | A:E  | base table: Carrier Name, LOC, TRUE, FALSE, Grand Total      |
//! | I:J  | region sub-table keys: Carrier Name, LOC                     |
//! | K:N  | filled here: Tracked, Not Tracked, Grand Total, Tracked%     |
//!
//! Each sub-table row whose (Carrier Name, LOC) key appears in the base table
//! gets that entry's counts plus `Tracked / Grand Total`. Keys are compared
//! trimmed and upper-cased. Rows with a blank key component, and rows whose
//! key is not in the base table, are left exactly as they were. Unlike the
//! Shipment Data columns, these are computed values, not formulas.

use crate::error::{ReportError, Result};
use shipment_report_sheet::{column_index_to_letters, CellValue, Sheet};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Column positions (0-based) of the LOC test data layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    pub base_carrier: usize,
    pub base_loc: usize,
    pub base_tracked: usize,
    pub base_not_tracked: usize,
    pub base_grand_total: usize,
    pub sub_carrier: usize,
    pub sub_loc: usize,
    pub out_tracked: usize,
    pub out_not_tracked: usize,
    pub out_grand_total: usize,
    pub out_tracked_pct: usize,
}

impl RegionLayout {
    /// A:E base table, I:J keys, K:N outputs
    pub const STANDARD: RegionLayout = RegionLayout {
        base_carrier: 0,
        base_loc: 1,
        base_tracked: 2,
        base_not_tracked: 3,
        base_grand_total: 4,
        sub_carrier: 8,
        sub_loc: 9,
        out_tracked: 10,
        out_not_tracked: 11,
        out_grand_total: 12,
        out_tracked_pct: 13,
    };

    /// Fewest columns a sheet needs for every position to exist
    #[must_use]
    pub fn min_width(&self) -> usize {
        [
            self.base_carrier,
            self.base_loc,
            self.base_tracked,
            self.base_not_tracked,
            self.base_grand_total,
            self.sub_carrier,
            self.sub_loc,
            self.out_tracked,
            self.out_not_tracked,
            self.out_grand_total,
            self.out_tracked_pct,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }

    /// Fail unless `sheet` is wide enough for this layout
    pub fn check_width(&self, sheet: &Sheet, label: &str) -> Result<()> {
        let required = self.min_width();
        let found = sheet.col_count();
        if found < required {
            return Err(ReportError::RegionTooNarrow {
                label: label.to_string(),
                found,
                required,
                last_column: column_index_to_letters(required - 1),
            });
        }
        Ok(())
    }
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Composite (Carrier Name, LOC) key, trimmed and upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    carrier: String,
    loc: String,
}

impl LocationKey {
    /// Build a key from two cells; `None` when either is null or blank
    #[must_use]
    pub fn from_cells(carrier: &CellValue, loc: &CellValue) -> Option<Self> {
        Some(LocationKey {
            carrier: normalize_key_part(carrier)?,
            loc: normalize_key_part(loc)?,
        })
    }

    #[must_use]
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    #[must_use]
    pub fn loc(&self) -> &str {
        &self.loc
    }
}

fn normalize_key_part(cell: &CellValue) -> Option<String> {
    if cell.is_null() {
        return None;
    }
    let text = cell.as_str();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
}

/// Counts for one location; a field is `None` when the source cell was not numeric
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationCounts {
    pub tracked: Option<f64>,
    pub not_tracked: Option<f64>,
    pub grand_total: Option<f64>,
}

impl LocationCounts {
    /// `tracked / grand_total`, or `None` when the total is absent or zero
    /// or the quotient is not a finite number
    #[must_use]
    pub fn tracked_ratio(&self) -> Option<f64> {
        let tracked = self.tracked?;
        let total = self.grand_total?;
        if total == 0.0 {
            return None;
        }
        let ratio = tracked / total;
        ratio.is_finite().then_some(ratio)
    }
}

/// Base mapping from location key to counts.
///
/// When a key occurs on several base rows the first occurrence wins; later
/// rows are counted as duplicates (and as conflicts when their counts differ).
#[derive(Debug, Clone, Default)]
pub struct LocationKeyMap {
    entries: HashMap<LocationKey, LocationCounts>,
    duplicate_rows: usize,
    conflicting_rows: usize,
}

impl LocationKeyMap {
    /// Build the map from the base-table columns of `sheet`'s records
    #[must_use]
    pub fn from_sheet(sheet: &Sheet, layout: &RegionLayout) -> Self {
        let mut map = LocationKeyMap::default();

        for row in sheet.records() {
            let cell = |col: usize| row.get(col).unwrap_or(&CellValue::Null);
            let Some(key) = LocationKey::from_cells(cell(layout.base_carrier), cell(layout.base_loc))
            else {
                continue;
            };
            let counts = LocationCounts {
                tracked: cell(layout.base_tracked).to_number(),
                not_tracked: cell(layout.base_not_tracked).to_number(),
                grand_total: cell(layout.base_grand_total).to_number(),
            };
            map.insert(key, counts);
        }

        map
    }

    /// Insert `counts` unless the key is already present
    pub fn insert(&mut self, key: LocationKey, counts: LocationCounts) {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(counts);
            }
            Entry::Occupied(existing) => {
                self.duplicate_rows += 1;
                if *existing.get() != counts {
                    self.conflicting_rows += 1;
                    tracing::debug!(
                        carrier = existing.key().carrier(),
                        loc = existing.key().loc(),
                        "conflicting duplicate base row ignored"
                    );
                }
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &LocationKey) -> Option<&LocationCounts> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Base rows dropped because their key was already present
    #[must_use]
    pub fn duplicate_rows(&self) -> usize {
        self.duplicate_rows
    }

    /// Dropped duplicates whose counts differed from the kept entry
    #[must_use]
    pub fn conflicting_rows(&self) -> usize {
        self.conflicting_rows
    }
}

/// What a reconciliation pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileSummary {
    pub base_keys: usize,
    pub duplicate_base_rows: usize,
    pub conflicting_base_rows: usize,
    /// Sub-table rows with both key parts present
    pub eligible_rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    /// Rows left alone because a key part was blank
    pub skipped_rows: usize,
}

/// Fill the output columns of every eligible, matched sub-table row in place
pub fn fill_region(sheet: &mut Sheet, map: &LocationKeyMap, layout: &RegionLayout) -> ReconcileSummary {
    let mut summary = ReconcileSummary {
        base_keys: map.len(),
        duplicate_base_rows: map.duplicate_rows(),
        conflicting_base_rows: map.conflicting_rows(),
        ..ReconcileSummary::default()
    };

    for row in sheet.records_mut() {
        let key = match (row.get(layout.sub_carrier), row.get(layout.sub_loc)) {
            (Some(carrier), Some(loc)) => LocationKey::from_cells(carrier, loc),
            _ => None,
        };
        let Some(key) = key else {
            summary.skipped_rows += 1;
            continue;
        };
        summary.eligible_rows += 1;

        let Some(counts) = map.get(&key) else {
            summary.unmatched_rows += 1;
            continue;
        };
        summary.matched_rows += 1;

        let writes = [
            (layout.out_tracked, counts.tracked),
            (layout.out_not_tracked, counts.not_tracked),
            (layout.out_grand_total, counts.grand_total),
            (layout.out_tracked_pct, counts.tracked_ratio()),
        ];
        for (col, value) in writes {
            if let Some(cell) = row.get_mut(col) {
                *cell = value.map_or(CellValue::Null, CellValue::Float);
            }
        }
    }

    summary
}

/// A reconciled LOC test data sheet
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub sheet: Sheet,
    pub summary: ReconcileSummary,
}

/// Reconcile a LOC test data sheet with the standard layout.
///
/// Fails only when the sheet is narrower than the layout; every data problem
/// (blank keys, non-numeric counts, zero totals) degrades to a blank cell.
pub fn reconcile(sheet: Sheet, label: &str) -> Result<Reconciliation> {
    reconcile_with_layout(sheet, &RegionLayout::STANDARD, label)
}

/// Reconcile using an explicit layout
pub fn reconcile_with_layout(
    mut sheet: Sheet,
    layout: &RegionLayout,
    label: &str,
) -> Result<Reconciliation> {
    layout.check_width(&sheet, label)?;
    sheet.pad_to_width();

    let map = LocationKeyMap::from_sheet(&sheet, layout);
    tracing::debug!(
        keys = map.len(),
        duplicates = map.duplicate_rows(),
        "built location key map"
    );
    if map.conflicting_rows() > 0 {
        tracing::warn!(
            conflicts = map.conflicting_rows(),
            "base table repeats keys with different counts; first occurrence kept"
        );
    }

    let summary = fill_region(&mut sheet, &map, layout);
    tracing::info!(
        eligible = summary.eligible_rows,
        matched = summary.matched_rows,
        unmatched = summary.unmatched_rows,
        skipped = summary.skipped_rows,
        "reconciled {label}"
    );

    Ok(Reconciliation { sheet, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [&str; 14] = [
        "Carrier Name", "LOC", "TRUE", "FALSE", "Grand Total", "", "", "",
        "Carrier Name", "LOC", "Tracked", "Not Tracked", "Grand Total", "Tracked%",
    ];

    fn row(cells: &[(usize, CellValue)]) -> Vec<CellValue> {
        let mut row = vec![CellValue::Null; 14];
        for (col, value) in cells {
            row[*col] = value.clone();
        }
        row
    }

    fn s(text: &str) -> CellValue {
        CellValue::String(text.to_string())
    }

    fn base(carrier: &str, loc: &str, t: CellValue, f: CellValue, total: CellValue) -> Vec<(usize, CellValue)> {
        vec![(0, s(carrier)), (1, s(loc)), (2, t), (3, f), (4, total)]
    }

    fn sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
        let header: Vec<CellValue> = HEADER.iter().map(|h| CellValue::from(*h)).collect();
        Sheet::from_records(header, rows)
    }

    #[test]
    fn test_matched_row_gets_counts_and_ratio() {
        let mut cells = base("FEDEX", "ATL", CellValue::Int(3), CellValue::Int(1), CellValue::Int(4));
        cells.extend([(8, s(" fedex ")), (9, s("atl"))]);
        let result = reconcile(sheet(vec![row(&cells)]), "LOC test data").unwrap();

        let out = &result.sheet;
        assert_eq!(out.get(1, 10).unwrap(), &CellValue::Float(3.0));
        assert_eq!(out.get(1, 11).unwrap(), &CellValue::Float(1.0));
        assert_eq!(out.get(1, 12).unwrap(), &CellValue::Float(4.0));
        assert_eq!(out.get(1, 13).unwrap(), &CellValue::Float(0.75));
        assert_eq!(result.summary.matched_rows, 1);
    }

    #[test]
    fn test_sub_rows_match_base_rows_elsewhere_in_sheet() {
        let rows = vec![
            row(&base("ACME", "DFW", CellValue::Int(2), CellValue::Int(2), CellValue::Int(4))),
            row(&base("GLOBEX", "ORD", CellValue::Int(5), CellValue::Int(0), CellValue::Int(5))),
            row(&[(8, s("globex")), (9, s("ord "))]),
            row(&[(8, s("Acme")), (9, s("DFW"))]),
        ];
        let out = reconcile(sheet(rows), "LOC test data").unwrap().sheet;

        assert_eq!(out.get(3, 10).unwrap(), &CellValue::Float(5.0));
        assert_eq!(out.get(3, 13).unwrap(), &CellValue::Float(1.0));
        assert_eq!(out.get(4, 12).unwrap(), &CellValue::Float(4.0));
        assert_eq!(out.get(4, 13).unwrap(), &CellValue::Float(0.5));
    }

    #[test]
    fn test_zero_or_missing_total_leaves_ratio_blank() {
        let rows = vec![
            row(&base("A", "X", CellValue::Int(1), CellValue::Int(0), CellValue::Int(0))),
            row(&base("B", "Y", CellValue::Int(1), CellValue::Int(0), s("n/a"))),
            row(&[(8, s("A")), (9, s("X")), (13, s("stale"))]),
            row(&[(8, s("B")), (9, s("Y"))]),
        ];
        let out = reconcile(sheet(rows), "LOC test data").unwrap().sheet;

        assert_eq!(out.get(3, 12).unwrap(), &CellValue::Float(0.0));
        assert!(out.get(3, 13).unwrap().is_null());
        assert!(out.get(4, 12).unwrap().is_null());
        assert!(out.get(4, 13).unwrap().is_null());
    }

    #[test]
    fn test_blank_key_rows_are_untouched() {
        let rows = vec![
            row(&base("A", "X", CellValue::Int(1), CellValue::Int(1), CellValue::Int(2))),
            row(&[(8, s("A")), (9, s("   ")), (10, s("keep")), (13, CellValue::Int(9))]),
            row(&[(9, s("X")), (11, s("also keep"))]),
        ];
        let input = sheet(rows);
        let result = reconcile(input.clone(), "LOC test data").unwrap();

        for r in [2, 3] {
            for c in 10..14 {
                assert_eq!(result.sheet.get(r, c).unwrap(), input.get(r, c).unwrap());
            }
        }
        // the base row has no sub-table key either
        assert_eq!(result.summary.skipped_rows, 3);
        assert_eq!(result.summary.eligible_rows, 0);
    }

    #[test]
    fn test_unmatched_rows_keep_existing_content() {
        let rows = vec![
            row(&base("A", "X", CellValue::Int(1), CellValue::Int(1), CellValue::Int(2))),
            row(&[(8, s("A")), (9, s("Z")), (10, CellValue::Int(7))]),
        ];
        let result = reconcile(sheet(rows), "LOC test data").unwrap();

        assert_eq!(result.sheet.get(2, 10).unwrap(), &CellValue::Int(7));
        assert_eq!(result.summary.unmatched_rows, 1);
    }

    #[test]
    fn test_row_count_and_order_preserved() {
        let rows: Vec<Vec<CellValue>> = (0..20)
            .map(|i| row(&[(5, CellValue::Int(i)), (8, s("A")), (9, s(if i % 2 == 0 { "X" } else { "" }))]))
            .collect();
        let input = sheet(rows);
        let out = reconcile(input.clone(), "LOC test data").unwrap().sheet;

        assert_eq!(out.row_count(), input.row_count());
        for r in 1..=20 {
            assert_eq!(out.get(r, 5).unwrap(), input.get(r, 5).unwrap());
        }
    }

    #[test]
    fn test_first_duplicate_wins() {
        let rows = vec![
            row(&base("A", "X", CellValue::Int(1), CellValue::Int(1), CellValue::Int(2))),
            row(&base(" a ", "x", CellValue::Int(9), CellValue::Int(9), CellValue::Int(18))),
            row(&base("A", "X", CellValue::Int(1), CellValue::Int(1), CellValue::Int(2))),
            row(&[(8, s("A")), (9, s("X"))]),
        ];
        let result = reconcile(sheet(rows), "LOC test data").unwrap();

        assert_eq!(result.sheet.get(4, 10).unwrap(), &CellValue::Float(1.0));
        assert_eq!(result.summary.base_keys, 1);
        assert_eq!(result.summary.duplicate_base_rows, 2);
        assert_eq!(result.summary.conflicting_base_rows, 1);
    }

    #[test]
    fn test_numeric_text_counts_are_coerced() {
        let rows = vec![
            row(&base("A", "X", s(" 3 "), s("oops"), s("6"))),
            row(&[(8, s("A")), (9, s("X"))]),
        ];
        let out = reconcile(sheet(rows), "LOC test data").unwrap().sheet;

        assert_eq!(out.get(2, 10).unwrap(), &CellValue::Float(3.0));
        assert!(out.get(2, 11).unwrap().is_null());
        assert_eq!(out.get(2, 13).unwrap(), &CellValue::Float(0.5));
    }

    #[test]
    fn test_numeric_keys_match_text_keys() {
        let rows = vec![
            row(&[(0, s("ACME")), (1, CellValue::Int(100)), (2, CellValue::Int(1)), (4, CellValue::Int(1))]),
            row(&[(8, s("acme")), (9, s("100"))]),
        ];
        let out = reconcile(sheet(rows), "LOC test data").unwrap().sheet;
        assert_eq!(out.get(2, 13).unwrap(), &CellValue::Float(1.0));
    }

    #[test]
    fn test_narrow_sheet_is_rejected() {
        let narrow = Sheet::from_records(vec!["a"; 10], vec![vec![1; 10]]);
        let err = reconcile(narrow, "LOC test data").unwrap_err();
        match err {
            ReportError::RegionTooNarrow { found, required, last_column, .. } => {
                assert_eq!((found, required), (10, 14));
                assert_eq!(last_column, "N");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tracked_ratio() {
        let counts = |t, g| LocationCounts { tracked: t, not_tracked: None, grand_total: g };
        assert_eq!(counts(Some(1.0), Some(4.0)).tracked_ratio(), Some(0.25));
        assert_eq!(counts(Some(1.0), Some(0.0)).tracked_ratio(), None);
        assert_eq!(counts(None, Some(4.0)).tracked_ratio(), None);
        assert_eq!(counts(Some(1.0), None).tracked_ratio(), None);
        assert_eq!(counts(Some(f64::MAX), Some(f64::MIN_POSITIVE)).tracked_ratio(), None);
    }

    #[test]
    fn test_key_normalization() {
        let a = LocationKey::from_cells(&s(" fedex "), &s("atl")).unwrap();
        let b = LocationKey::from_cells(&s("FEDEX"), &s("ATL")).unwrap();
        assert_eq!(a, b);
        assert!(LocationKey::from_cells(&CellValue::Null, &s("ATL")).is_none());
        assert!(LocationKey::from_cells(&s("FEDEX"), &s("  ")).is_none());
    }
}
