use std::fmt;

/// A non-fatal notice raised while building a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// A workbook input had no sheet with the expected name; another sheet was read
    SheetFallback {
        label: String,
        expected: String,
        used: String,
    },
    /// The raw export has more columns than a standard export
    WideShipmentExport { columns: usize, nominal: usize },
    /// Column widths could not be applied to the shipments sheet
    ColumnWidthsSkipped { reason: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::SheetFallback {
                label,
                expected,
                used,
            } => write!(
                f,
                "{label} note: the workbook has no '{expected}' sheet, so the first sheet ('{used}') was used."
            ),
            Advisory::WideShipmentExport { columns, nominal } => write!(
                f,
                "Heads up: Raw export contains {columns} columns, more than the usual {nominal}. \
                 That's okay; Trailer/Network/LOC will still be appended at the end."
            ),
            Advisory::ColumnWidthsSkipped { reason } => {
                write!(f, "Column widths were not applied: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let advisory = Advisory::SheetFallback {
            label: "Criteria".to_string(),
            expected: "Criteria".to_string(),
            used: "Sheet1".to_string(),
        };
        assert_eq!(
            advisory.to_string(),
            "Criteria note: the workbook has no 'Criteria' sheet, so the first sheet ('Sheet1') was used."
        );

        let wide = Advisory::WideShipmentExport {
            columns: 52,
            nominal: 49,
        };
        assert!(wide.to_string().starts_with("Heads up: Raw export contains 52 columns"));
    }
}
