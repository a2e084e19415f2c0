use shipment_report_sheet::SheetError;
use thiserror::Error;

/// Errors that stop a report from being produced
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{label} is missing required column(s): {}", .missing.join(", "))]
    MissingColumns {
        label: String,
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error(
        "{label} sheet does not have enough columns (needs up to column {last_column}): \
         found {found}, need at least {required}"
    )]
    RegionTooNarrow {
        label: String,
        found: usize,
        required: usize,
        last_column: String,
    },

    #[error("{label} could not be read from {origin}: {source}")]
    Unreadable {
        label: String,
        origin: String,
        #[source]
        source: SheetError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

impl ReportError {
    /// Whether this is an expected, user-facing diagnostic about the inputs
    /// (as opposed to an unexpected failure while building the workbook)
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            ReportError::MissingColumns { .. }
                | ReportError::RegionTooNarrow { .. }
                | ReportError::Unreadable { .. }
                | ReportError::Config(_)
        )
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Workbook(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
