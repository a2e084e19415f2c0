use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// CSV reader options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvOptions {
    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Sheet {
    /// Load a sheet from a CSV file with custom options
    pub fn from_csv_with_options<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Self::from_csv_reader(reader, options)
    }

    /// Load a sheet from a reader, inferring cell types.
    ///
    /// Short rows are padded with nulls so the grid is rectangular. Columns
    /// are left unnamed; callers pick the header row.
    pub fn from_csv_reader<R: Read>(reader: R, options: CsvOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false) // We handle headers ourselves
            .flexible(true)
            .from_reader(reader);

        let mut data: Vec<Vec<CellValue>> = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            data.push(record.iter().map(CellValue::parse).collect());
        }

        let mut sheet = Sheet::from_data(data);
        sheet.pad_to_width();
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_header_row() {
        let content = "Carrier Name,Order Number\nACME,FX12345\nGLOBEX,00042\n";
        let mut sheet = Sheet::from_csv_reader(content.as_bytes(), CsvOptions::default()).unwrap();
        assert!(sheet.column_names().is_none());

        sheet.name_columns_by_row(0).unwrap();
        assert_eq!(sheet.record_count(), 2);
        assert!(sheet.has_column("Order Number"));
        assert_eq!(sheet.get_by_name(1, "Order Number").unwrap().as_str(), "00042");
    }

    #[test]
    fn test_csv_ragged_rows_are_padded() {
        let content = "a,b,c\n1\n2,3,4\n";
        let sheet = Sheet::from_csv_reader(content.as_bytes(), CsvOptions::default()).unwrap();

        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.row(1).unwrap().len(), 3);
        assert!(sheet.get(1, 2).unwrap().is_null());
    }

    #[test]
    fn test_tab_delimiter() {
        let content = "id\tvalue\n1\t2.5\n";
        let options = CsvOptions::default().with_delimiter(b'\t');
        let sheet = Sheet::from_csv_reader(content.as_bytes(), options).unwrap();

        assert_eq!(sheet.col_count(), 2);
        assert_eq!(sheet.get(1, 0).unwrap(), &CellValue::Int(1));
        assert_eq!(sheet.get(1, 1).unwrap(), &CellValue::Float(2.5));
    }
}
