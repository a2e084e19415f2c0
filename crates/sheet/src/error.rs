use thiserror::Error;

/// Errors that can occur during sheet operations
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Index out of bounds: row {row}, col {col} (sheet has {rows} rows, {cols} cols)")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Row index out of bounds: {index} (sheet has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Columns not named: {0}")]
    ColumnsNotNamed(String),

    #[error("Invalid column letters: {0}")]
    InvalidColumnLetters(String),

    #[error("Unsupported file type for '{path}'. Please upload .csv or .xlsx")]
    UnsupportedFileType { path: String },

    #[error("Workbook '{path}' contains no sheets")]
    NoSheets { path: String },

    #[error("Excel read error: {0}")]
    ExcelRead(String),

    #[error("Excel write error: {0}")]
    ExcelWrite(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for SheetError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SheetError::ExcelWrite(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
