//! End-to-end report generation: load, validate, reconcile, assemble.

use crate::advisory::Advisory;
use crate::assemble::{assemble, ShipmentTable};
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::reconcile::{reconcile, ReconcileSummary};
use crate::schema::{validate_columns, REQUIRED_SHIPMENT_COLUMNS};
use shipment_report_sheet::{LoadedTable, TableSource};

/// Label used for the shipment dataset in diagnostics
pub const SHIPMENTS_LABEL: &str = "Raw export";
pub const CRITERIA_LABEL: &str = "Criteria";
pub const LOC_TEST_DATA_LABEL: &str = "LOC test data";

/// The datasets a report is built from
pub struct ReportInputs<'a> {
    pub shipments: &'a dyn TableSource,
    pub criteria: &'a dyn TableSource,
    pub loc_test_data: Option<&'a dyn TableSource>,
}

/// A finished report
#[derive(Debug, Clone)]
pub struct Report {
    /// The `.xlsx` document
    pub bytes: Vec<u8>,
    pub advisories: Vec<Advisory>,
    /// Number of shipment rows in the table
    pub shipment_rows: usize,
    /// Present when LOC test data was supplied
    pub reconcile_summary: Option<ReconcileSummary>,
}

fn load(
    source: &dyn TableSource,
    preferred_sheet: Option<&str>,
    label: &str,
    advisories: &mut Vec<Advisory>,
) -> Result<LoadedTable> {
    let loaded = source
        .load(preferred_sheet)
        .map_err(|source_err| ReportError::Unreadable {
            label: label.to_string(),
            origin: source.describe(),
            source: source_err,
        })?;

    if loaded.fell_back() {
        let expected = loaded.requested_sheet.clone().unwrap_or_default();
        let used = loaded.used_sheet.clone().unwrap_or_default();
        tracing::warn!(%label, %expected, %used, "expected sheet missing, using first sheet");
        advisories.push(Advisory::SheetFallback {
            label: label.to_string(),
            expected,
            used,
        });
    }

    tracing::debug!(%label, rows = loaded.sheet.record_count(), "loaded dataset");
    Ok(loaded)
}

/// Build the report workbook.
///
/// Every input is loaded and checked before anything is written, so a failure
/// never yields partial output. Sheet fallbacks, a wide export and skipped
/// column widths are reported as advisories on the returned [`Report`].
pub fn generate_report(inputs: &ReportInputs<'_>, config: &ReportConfig) -> Result<Report> {
    config.validate()?;
    let mut advisories = Vec::new();

    let shipments = load(inputs.shipments, None, SHIPMENTS_LABEL, &mut advisories)?.sheet;
    let criteria = load(
        inputs.criteria,
        Some(config.sheets.criteria.as_str()),
        CRITERIA_LABEL,
        &mut advisories,
    )?
    .sheet;
    let loc_test_data = inputs
        .loc_test_data
        .map(|source| {
            load(
                source,
                Some(config.sheets.loc_test_data.as_str()),
                LOC_TEST_DATA_LABEL,
                &mut advisories,
            )
        })
        .transpose()?;

    validate_columns(&shipments, &REQUIRED_SHIPMENT_COLUMNS, SHIPMENTS_LABEL)?;

    let columns = shipments.col_count();
    if columns > config.nominal_shipment_width {
        tracing::warn!(
            columns,
            nominal = config.nominal_shipment_width,
            "raw export is wider than usual"
        );
        advisories.push(Advisory::WideShipmentExport {
            columns,
            nominal: config.nominal_shipment_width,
        });
    }

    let reconciliation = loc_test_data
        .map(|loaded| reconcile(loaded.sheet, LOC_TEST_DATA_LABEL))
        .transpose()?;

    let table = ShipmentTable::build(shipments, config)?;
    let shipment_rows = table.sheet.record_count();

    let (bytes, assembly_advisories) = assemble(
        &criteria,
        &table,
        reconciliation.as_ref().map(|r| &r.sheet),
        config,
    )?;
    advisories.extend(assembly_advisories);

    tracing::info!(
        shipment_rows,
        bytes = bytes.len(),
        advisories = advisories.len(),
        "report workbook built"
    );

    Ok(Report {
        bytes,
        advisories,
        shipment_rows,
        reconcile_summary: reconciliation.map(|r| r.summary),
    })
}
