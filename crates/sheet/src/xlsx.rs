use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Worksheet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// A worksheet read from a spreadsheet workbook, with the sheet list it came from
#[derive(Debug, Clone)]
pub(crate) struct ExcelLoad {
    pub sheet: Sheet,
    pub available: Vec<String>,
}

/// Load `preferred` from the workbook at `path` when it exists, else the first sheet.
///
/// The grid is anchored at column A: calamine trims leading empty columns from
/// the used range, so they are restored to keep positional access stable.
pub(crate) fn load_excel(path: &Path, preferred: Option<&str>) -> Result<ExcelLoad> {
    let mut workbook: Sheets<BufReader<File>> =
        open_workbook_auto(path).map_err(|e| SheetError::ExcelRead(e.to_string()))?;

    let available = workbook.sheet_names();
    let chosen = preferred
        .filter(|name| available.iter().any(|s| s == name))
        .map(str::to_string)
        .or_else(|| available.first().cloned())
        .ok_or_else(|| SheetError::NoSheets {
            path: path.display().to_string(),
        })?;

    let range = workbook
        .worksheet_range(&chosen)
        .map_err(|e| SheetError::ExcelRead(e.to_string()))?;

    let lead_cols = range.start().map_or(0, |(_, col)| col as usize);
    let data: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| {
            let mut cells = vec![CellValue::Null; lead_cols];
            cells.extend(row.iter().map(data_to_cell_value));
            cells
        })
        .collect();

    let mut sheet = Sheet::with_name(&chosen);
    *sheet.data_mut() = data;
    sheet.pad_to_width();

    Ok(ExcelLoad { sheet, available })
}

fn to_row(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| SheetError::ExcelWrite("Row index overflow".to_string()))
}

fn to_col(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| SheetError::ExcelWrite("Column index overflow".to_string()))
}

/// Cell formats shared by every sheet written into one workbook
#[derive(Debug, Clone)]
pub struct CellFormats {
    pub header: Format,
    pub date: Format,
    pub datetime: Format,
}

impl Default for CellFormats {
    fn default() -> Self {
        CellFormats {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    formats: &CellFormats,
) -> Result<()> {
    match cell {
        CellValue::Null => {} // Leave empty
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Int(i) => {
            // Excel stores all numbers as f64, so integers > 2^53 may lose precision
            worksheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        CellValue::DateTime(serial) => {
            let format = if serial.fract() == 0.0 {
                &formats.date
            } else {
                &formats.datetime
            };
            worksheet.write_number_with_format(row, col, *serial, format)?;
        }
        CellValue::String(s) => {
            worksheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}

impl Sheet {
    /// Write the whole grid starting at A1; a named header row is written bold.
    ///
    /// # Errors
    ///
    /// Returns error if a cell cannot be written.
    pub fn write_to_worksheet(&self, worksheet: &mut Worksheet, formats: &CellFormats) -> Result<()> {
        let header_is_named = self.header().is_some();
        for (row_idx, row) in self.data().iter().enumerate() {
            let row_num = to_row(row_idx)?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = to_col(col_idx)?;
                if row_idx == 0 && header_is_named && !cell.is_null() {
                    worksheet.write_string_with_format(row_num, col_num, cell.as_str(), &formats.header)?;
                } else {
                    write_cell(worksheet, row_num, col_num, cell, formats)?;
                }
            }
        }
        Ok(())
    }

    /// Write only the rows below the header, the first one landing on `first_row`.
    ///
    /// # Errors
    ///
    /// Returns error if a cell cannot be written.
    pub fn write_records_to_worksheet(
        &self,
        worksheet: &mut Worksheet,
        first_row: usize,
        formats: &CellFormats,
    ) -> Result<()> {
        for (offset, row) in self.records().enumerate() {
            let row_num = to_row(first_row + offset)?;
            for (col_idx, cell) in row.iter().enumerate() {
                write_cell(worksheet, row_num, to_col(col_idx)?, cell, formats)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn write_book(path: &Path, sheets: &[(&str, Vec<Vec<&str>>)]) {
        let mut workbook = Workbook::new();
        for (name, rows) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*name).unwrap();
            for (r, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    if !value.is_empty() {
                        worksheet.write_string(r as u32, c as u16, *value).unwrap();
                    }
                }
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_load_preferred_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_book(
            &path,
            &[
                ("Summary", vec![vec!["x"]]),
                ("Criteria", vec![vec!["Carrier Name", "LOC"], vec!["ACME", "ATL"]]),
            ],
        );

        let load = load_excel(&path, Some("Criteria")).unwrap();
        assert_eq!(load.sheet.name(), "Criteria");
        assert_eq!(load.sheet.row_count(), 2);
        assert_eq!(load.available, vec!["Summary".to_string(), "Criteria".to_string()]);
    }

    #[test]
    fn test_load_falls_back_to_first_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_book(&path, &[("Data", vec![vec!["a"]]), ("Other", vec![vec!["b"]])]);

        let load = load_excel(&path, Some("Criteria")).unwrap();
        assert_eq!(load.sheet.name(), "Data");
        assert_eq!(load.sheet.get(0, 0).unwrap().as_str(), "a");
    }

    #[test]
    fn test_load_restores_leading_empty_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");
        write_book(&path, &[("Sheet1", vec![vec!["", "", "c"], vec!["", "", "3"]])]);

        let load = load_excel(&path, None).unwrap();
        assert_eq!(load.sheet.col_count(), 3);
        assert_eq!(load.sheet.get(0, 2).unwrap().as_str(), "c");
        assert!(load.sheet.get(0, 0).unwrap().is_null());
    }

    #[test]
    fn test_write_and_read_back_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("types.xlsx");

        let sheet = Sheet::from_records(
            vec!["text", "int", "float", "bool", "date"],
            vec![vec![
                CellValue::String("hello".to_string()),
                CellValue::Int(42),
                CellValue::Float(2.5),
                CellValue::Bool(true),
                CellValue::DateTime(45000.0),
            ]],
        );

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let worksheet = workbook.add_worksheet();
        sheet.write_to_worksheet(worksheet, &CellFormats::default()).unwrap();
        workbook.save(&path).unwrap();

        let loaded = load_excel(&path, None).unwrap().sheet;
        assert_eq!(loaded.row_count(), 2);
        assert_eq!(loaded.get(0, 0).unwrap().as_str(), "text");
        assert!(matches!(loaded.get(1, 1).unwrap(), CellValue::Float(f) if (*f - 42.0).abs() < 1e-9));
        assert!(matches!(loaded.get(1, 3).unwrap(), CellValue::Bool(true)));
        assert!(matches!(loaded.get(1, 4).unwrap(), CellValue::DateTime(f) if (*f - 45000.0).abs() < 1e-9));
    }
}
