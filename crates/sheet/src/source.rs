//! Table sources: where input datasets come from.
//!
//! A source yields one header-named [`Sheet`]. Spreadsheet workbooks are read
//! from a preferred sheet when it exists and from the first sheet otherwise;
//! the returned [`LoadedTable`] records which one was used.

use crate::csv::CsvOptions;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use crate::xlsx::load_excel;
use std::path::{Path, PathBuf};

/// On-disk formats a [`FileSource`] can read, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with the given field separator
    Delimited(u8),
    /// Any workbook calamine can open (.xlsx, .xlsm, .xls, .ods)
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Delimited(b',')),
            "tsv" => Ok(SourceFormat::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(SheetError::UnsupportedFileType {
                path: path.display().to_string(),
            }),
        }
    }
}

/// A dataset loaded from a source
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// The data, with columns named by its first row
    pub sheet: Sheet,
    /// Sheet the caller asked for, if any
    pub requested_sheet: Option<String>,
    /// Sheet actually read; `None` for sources without sheets
    pub used_sheet: Option<String>,
}

impl LoadedTable {
    /// True when a preferred sheet was requested but another sheet was read instead
    #[must_use]
    pub fn fell_back(&self) -> bool {
        match (&self.requested_sheet, &self.used_sheet) {
            (Some(requested), Some(used)) => requested != used,
            _ => false,
        }
    }
}

/// Anything that can supply a tabular dataset
pub trait TableSource {
    /// Human-readable origin used in diagnostics
    fn describe(&self) -> String;

    /// Load the dataset, preferring `preferred_sheet` when the source has sheets
    fn load(&self, preferred_sheet: Option<&str>) -> Result<LoadedTable>;
}

/// A table stored in a CSV/TSV or spreadsheet file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileSource { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self, preferred_sheet: Option<&str>) -> Result<LoadedTable> {
        let (mut sheet, used_sheet) = match SourceFormat::from_path(&self.path)? {
            SourceFormat::Delimited(delimiter) => {
                let options = CsvOptions::default().with_delimiter(delimiter);
                (Sheet::from_csv_with_options(&self.path, options)?, None)
            }
            SourceFormat::Spreadsheet => {
                let load = load_excel(&self.path, preferred_sheet)?;
                tracing::debug!(
                    path = %self.path.display(),
                    sheets = ?load.available,
                    "opened workbook"
                );
                let used = load.sheet.name().to_string();
                (load.sheet, Some(used))
            }
        };

        if sheet.row_count() > 0 {
            sheet.name_columns_by_row(0)?;
        }

        tracing::debug!(
            path = %self.path.display(),
            sheet = ?used_sheet,
            records = sheet.record_count(),
            columns = sheet.col_count(),
            "loaded table"
        );

        Ok(LoadedTable {
            sheet,
            requested_sheet: preferred_sheet.map(str::to_string),
            used_sheet,
        })
    }
}

/// An in-memory sheet is its own source; it never falls back
impl TableSource for Sheet {
    fn describe(&self) -> String {
        format!("in-memory sheet '{}'", self.name())
    }

    fn load(&self, preferred_sheet: Option<&str>) -> Result<LoadedTable> {
        Ok(LoadedTable {
            sheet: self.clone(),
            requested_sheet: preferred_sheet.map(str::to_string),
            used_sheet: preferred_sheet.map(str::to_string),
        })
    }
}
