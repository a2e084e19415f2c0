//! Output workbook layout.
//!
//! Sheets are written in a fixed order: Criteria (verbatim), Shipment Data (one
//! styled structured table whose last three columns are formulas), then the
//! reconciled LOC test data when there is one.

use crate::advisory::Advisory;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::formulas::{derived_columns, FormulaColumn, DERIVED_COLUMNS};
use rust_xlsxwriter::{Table, TableColumn, TableStyle, Workbook, Worksheet};
use shipment_report_sheet::{CellFormats, CellValue, Sheet};

/// Shipment rows with the derived columns in place, plus their formulas
#[derive(Debug, Clone)]
pub struct ShipmentTable {
    /// Header-named sheet whose last three columns are empty placeholders
    pub sheet: Sheet,
    pub formulas: Vec<FormulaColumn>,
}

impl ShipmentTable {
    /// Replace any existing Trailer/Network/LOC columns with empty placeholders
    /// at the end and attach the formulas that define them.
    pub fn build(mut sheet: Sheet, config: &ReportConfig) -> Result<Self> {
        let dropped = sheet.remove_columns_named(&DERIVED_COLUMNS)?;
        if dropped > 0 {
            tracing::debug!(dropped, "replaced existing derived columns");
        }
        for header in DERIVED_COLUMNS {
            sheet.column_append_named(header, CellValue::Null);
        }

        let formulas = derived_columns(
            &config.trailer,
            config.network_prefix_len,
            &config.criteria_lookup,
            &config.sheets.criteria,
        )?;

        Ok(ShipmentTable { sheet, formulas })
    }

    /// Header labels as written to the table: unique plain labels, then the
    /// derived column headers.
    #[must_use]
    pub fn header_labels(&self) -> Vec<String> {
        let mut labels = self.sheet.unique_header_labels();
        labels.truncate(labels.len().saturating_sub(self.formulas.len()));
        labels.extend(self.formulas.iter().map(|column| column.header.clone()));
        labels
    }

    /// Table columns: plain headers, then one formula column per derived header
    fn table_columns(&self, labels: &[String]) -> Vec<TableColumn> {
        let plain = labels.len().saturating_sub(self.formulas.len());

        let mut columns: Vec<TableColumn> = labels
            .iter()
            .take(plain)
            .map(|label| TableColumn::new().set_header(label))
            .collect();
        columns.extend(self.formulas.iter().map(|column| {
            TableColumn::new()
                .set_header(&column.header)
                .set_formula(column.formula.as_str())
        }));
        columns
    }
}

/// Builds the output workbook one sheet at a time
pub struct ReportWorkbook<'a> {
    config: &'a ReportConfig,
    workbook: Workbook,
    formats: CellFormats,
    advisories: Vec<Advisory>,
}

impl<'a> ReportWorkbook<'a> {
    #[must_use]
    pub fn new(config: &'a ReportConfig) -> Self {
        ReportWorkbook {
            config,
            workbook: Workbook::new(),
            formats: CellFormats::default(),
            advisories: Vec::new(),
        }
    }

    fn add_named_worksheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(name)?;
        Ok(worksheet)
    }

    /// Add a sheet holding `sheet`'s cells exactly as loaded
    pub fn add_plain_sheet(&mut self, name: &str, sheet: &Sheet) -> Result<()> {
        let formats = self.formats.clone();
        let worksheet = self.add_named_worksheet(name)?;
        sheet.write_to_worksheet(worksheet, &formats)?;
        Ok(())
    }

    /// Add the shipments sheet as a structured table with formula columns
    pub fn add_shipment_table(&mut self, table: &ShipmentTable) -> Result<()> {
        let config = self.config;
        let formats = self.formats.clone();
        let labels = table.header_labels();
        let last_col = u16::try_from(labels.len().saturating_sub(1))
            .map_err(|_| crate::ReportError::Workbook("too many shipment columns".to_string()))?;
        // Tables need at least one data row; an empty export gets one blank row.
        let last_row = u32::try_from(table.sheet.record_count().max(1))
            .map_err(|_| crate::ReportError::Workbook("too many shipment rows".to_string()))?;

        let xlsx_table = Table::new()
            .set_name(&config.table_name)
            .set_style(TableStyle::Medium2)
            .set_banded_rows(true)
            .set_banded_columns(false)
            .set_first_column(false)
            .set_last_column(false)
            .set_columns(&table.table_columns(&labels));

        let worksheet = self.add_named_worksheet(&config.sheets.shipments)?;
        table.sheet.write_records_to_worksheet(worksheet, 1, &formats)?;
        worksheet.add_table(0, 0, last_row, last_col, &xlsx_table)?;

        if let Err(reason) = apply_column_widths(worksheet, &labels, config) {
            tracing::warn!(%reason, "column widths not applied");
            self.advisories.push(Advisory::ColumnWidthsSkipped { reason });
        }

        tracing::debug!(
            rows = table.sheet.record_count(),
            columns = labels.len(),
            table = %config.table_name,
            "wrote shipment table"
        );
        Ok(())
    }

    /// Serialize the workbook
    pub fn finish(mut self) -> Result<(Vec<u8>, Vec<Advisory>)> {
        let bytes = self.workbook.save_to_buffer()?;
        Ok((bytes, self.advisories))
    }
}

fn apply_column_widths(
    worksheet: &mut Worksheet,
    labels: &[String],
    config: &ReportConfig,
) -> std::result::Result<(), String> {
    for (idx, label) in labels.iter().enumerate() {
        let col = u16::try_from(idx).map_err(|e| e.to_string())?;
        worksheet
            .set_column_width(col, config.column_width(label))
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Compose the full report workbook and serialize it to `.xlsx` bytes
pub fn assemble(
    criteria: &Sheet,
    shipments: &ShipmentTable,
    loc_test_data: Option<&Sheet>,
    config: &ReportConfig,
) -> Result<(Vec<u8>, Vec<Advisory>)> {
    let mut book = ReportWorkbook::new(config);
    book.add_plain_sheet(&config.sheets.criteria, criteria)?;
    book.add_shipment_table(shipments)?;
    if let Some(loc) = loc_test_data {
        book.add_plain_sheet(&config.sheets.loc_test_data, loc)?;
    }
    book.finish()
}
