//! Shipment report workbook builder
//!
//! Turns a raw shipment export and a Criteria table (plus, optionally, a LOC
//! test data template) into one `.xlsx` report:
//!
//! - **Criteria**: the reference table, copied verbatim.
//! - **Shipment Data**: a styled structured table over every shipment column,
//!   followed by `Trailer`, `Network` and `LOC` columns defined by Excel
//!   formulas. Nothing is evaluated here; Excel computes them on open.
//! - **LOC test data**: the template with its per-location sub-table filled in
//!   from the base table on the same sheet.
//!
//! # Example
//!
//! ```
//! use shipment_report_core::{generate_report, ReportConfig, ReportInputs};
//! use shipment_report_sheet::Sheet;
//!
//! let shipments = Sheet::from_records(
//!     vec!["Carrier Name", "Order Number", "Active Equipment ID", "Historical Equipment ID"],
//!     vec![vec!["ACME", "FX12345", "8618611234", ""]],
//! );
//! let criteria = Sheet::from_records(
//!     vec!["Carrier Name", "Region", "Notes", "LOC"],
//!     vec![vec!["ACME", "South", "", "ATL"]],
//! );
//!
//! let inputs = ReportInputs {
//!     shipments: &shipments,
//!     criteria: &criteria,
//!     loc_test_data: None,
//! };
//! let report = generate_report(&inputs, &ReportConfig::default()).unwrap();
//! assert_eq!(report.shipment_rows, 1);
//! ```

mod advisory;
mod assemble;
mod config;
mod error;
mod formulas;
mod pipeline;
mod reconcile;
mod schema;

pub use advisory::Advisory;
pub use assemble::{assemble, ReportWorkbook, ShipmentTable};
pub use config::{ReportConfig, SheetNames};
pub use error::{ReportError, Result};
pub use formulas::{
    derived_columns, network_code, network_formula, CriteriaLookup, FormulaColumn, TrailerRule,
    DERIVED_COLUMNS, LOC, NETWORK, TRAILER,
};
pub use pipeline::{
    generate_report, Report, ReportInputs, CRITERIA_LABEL, LOC_TEST_DATA_LABEL, SHIPMENTS_LABEL,
};
pub use reconcile::{
    fill_region, reconcile, reconcile_with_layout, LocationCounts, LocationKey, LocationKeyMap,
    ReconcileSummary, Reconciliation, RegionLayout,
};
pub use schema::{
    validate_columns, ACTIVE_EQUIPMENT_ID, CARRIER_NAME, HISTORICAL_EQUIPMENT_ID, ORDER_NUMBER,
    REQUIRED_SHIPMENT_COLUMNS,
};
