//! Required-column checks for input datasets.

use crate::error::{ReportError, Result};
use shipment_report_sheet::Sheet;

pub const CARRIER_NAME: &str = "Carrier Name";
pub const ORDER_NUMBER: &str = "Order Number";
pub const ACTIVE_EQUIPMENT_ID: &str = "Active Equipment ID";
pub const HISTORICAL_EQUIPMENT_ID: &str = "Historical Equipment ID";

/// Columns every raw shipment export must carry (exact spelling and case)
pub const REQUIRED_SHIPMENT_COLUMNS: [&str; 4] = [
    CARRIER_NAME,
    ORDER_NUMBER,
    ACTIVE_EQUIPMENT_ID,
    HISTORICAL_EQUIPMENT_ID,
];

/// Check that `sheet` names every column in `required`.
///
/// On failure the error lists all missing names in `required` order, not just
/// the first, together with the columns that were found.
pub fn validate_columns(sheet: &Sheet, required: &[&str], label: &str) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !sheet.has_column(name))
        .map(|name| (*name).to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(ReportError::MissingColumns {
        label: label.to_string(),
        missing,
        found: sheet.column_names().cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_present() {
        let sheet = Sheet::from_records(
            vec!["Ship Date", "Carrier Name", "Order Number", "Active Equipment ID", "Historical Equipment ID"],
            vec![vec!["2024-01-01", "ACME", "FX1", "861861", "x"]],
        );
        assert!(validate_columns(&sheet, &REQUIRED_SHIPMENT_COLUMNS, "Raw export").is_ok());
    }

    #[test]
    fn test_reports_every_missing_column() {
        let sheet = Sheet::from_records(vec!["carrier name", "Order Number"], Vec::<Vec<&str>>::new());

        let err = validate_columns(&sheet, &REQUIRED_SHIPMENT_COLUMNS, "Raw export").unwrap_err();
        match err {
            ReportError::MissingColumns { missing, found, .. } => {
                assert_eq!(
                    missing,
                    vec!["Carrier Name", "Active Equipment ID", "Historical Equipment ID"]
                );
                assert_eq!(found, vec!["carrier name", "Order Number"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unnamed_sheet_misses_everything() {
        let sheet = Sheet::new();
        let err = validate_columns(&sheet, &REQUIRED_SHIPMENT_COLUMNS, "Raw export").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Raw export is missing required column(s): Carrier Name, Order Number, \
             Active Equipment ID, Historical Equipment ID"
        );
    }
}
