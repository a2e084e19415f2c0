//! Sheet model and table sources for shipment-report
//!
//! Provides a small grid type for tabular data read from CSV or spreadsheet
//! files, plus helpers to write that data back into an `.xlsx` worksheet.
//!
//! # Examples
//!
//! ## Creating a sheet with a header
//!
//! ```
//! use shipment_report_sheet::{Sheet, CellValue};
//!
//! let sheet = Sheet::from_records(
//!     vec!["Carrier Name", "LOC"],
//!     vec![vec!["ACME", "ATL"], vec!["GLOBEX", "DFW"]],
//! );
//!
//! assert_eq!(sheet.record_count(), 2);
//! assert_eq!(sheet.get_by_name(1, "LOC").unwrap(), &CellValue::from("DFW"));
//! ```
//!
//! ## Loading from a file
//!
//! ```no_run
//! use shipment_report_sheet::{FileSource, TableSource};
//!
//! let table = FileSource::new("criteria.xlsx").load(Some("Criteria")).unwrap();
//! if table.fell_back() {
//!     eprintln!("no 'Criteria' sheet, read {:?}", table.used_sheet);
//! }
//! ```

mod a1_notation;
mod cell;
mod csv;
mod error;
mod sheet;
mod source;
mod xlsx;

/// Re-export column letter helpers.
pub use a1_notation::{absolute_column_range, column_index_to_letters, parse_column_letters};
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export table source types.
pub use source::{FileSource, LoadedTable, SourceFormat, TableSource};
/// Re-export worksheet cell formats.
pub use xlsx::CellFormats;
