use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::{HashMap, HashSet};

/// A sheet representing a 2D grid of cells (row-major storage)
///
/// When columns are named, row 0 holds the header and the remaining rows are
/// records. Positional access (`get`, `row`) always addresses the raw grid,
/// header included.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue> + Clone>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Sheet {
            name: "Sheet1".to_string(),
            data: converted,
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet from a header row and records, with columns named
    #[must_use]
    pub fn from_records<H, T>(header: Vec<H>, records: Vec<Vec<T>>) -> Self
    where
        H: Into<CellValue>,
        T: Into<CellValue> + Clone,
    {
        let mut data = vec![header.into_iter().map(Into::into).collect::<Vec<_>>()];
        data.extend(
            records
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect::<Vec<_>>()),
        );
        let mut sheet = Sheet::with_name("Sheet1");
        sheet.data = data;
        sheet.pad_to_width();
        sheet.name_columns_by_header();
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of rows (header included)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of rows below the header (all rows when columns are not named)
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.data.len().saturating_sub(self.header_offset())
    }

    fn header_offset(&self) -> usize {
        usize::from(self.column_names.is_some() && !self.data.is_empty())
    }

    /// Pad ragged rows with nulls so every row has `col_count` cells
    pub fn pad_to_width(&mut self) {
        let width = self.col_count();
        for row in &mut self.data {
            row.resize(width, CellValue::Null);
        }
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Get a cell value by record index (0-based, below the header) and column name
    pub fn get_by_name(&self, record: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index_by_name(col_name)?;
        self.get(record + self.header_offset(), col)
    }

    // ===== Row Operations =====

    /// Get a row by index (0-based)
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Header row, when columns are named
    #[must_use]
    pub fn header(&self) -> Option<&Vec<CellValue>> {
        self.column_names.as_ref().and(self.data.first())
    }

    /// Iterate over the rows below the header
    pub fn records(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter().skip(self.header_offset())
    }

    /// Iterate mutably over the rows below the header
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Vec<CellValue>> {
        let offset = self.header_offset();
        self.data.iter_mut().skip(offset)
    }

    // ===== Column Operations =====

    /// Append a named column whose records all hold `fill`
    pub fn column_append_named(&mut self, name: &str, fill: CellValue) {
        let width = self.col_count();
        if self.data.is_empty() {
            self.data.push(Vec::new());
        }
        for (i, row) in self.data.iter_mut().enumerate() {
            row.resize(width, CellValue::Null);
            if i == 0 {
                row.push(CellValue::String(name.to_string()));
            } else {
                row.push(fill.clone());
            }
        }
        self.name_columns_by_header();
    }

    /// Delete every column whose header matches one of `names`, ignoring case.
    /// Returns how many columns were removed.
    pub fn remove_columns_named(&mut self, names: &[&str]) -> Result<usize> {
        let header = self
            .column_names
            .as_ref()
            .ok_or_else(|| SheetError::ColumnsNotNamed("Call name_columns_by_row() first".to_string()))?;

        let targets: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        let remove: HashSet<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, name)| targets.contains(&name.to_lowercase()))
            .map(|(i, _)| i)
            .collect();

        if remove.is_empty() {
            return Ok(0);
        }

        for row in &mut self.data {
            let kept: Vec<CellValue> = std::mem::take(row)
                .into_iter()
                .enumerate()
                .filter(|(i, _)| !remove.contains(i))
                .map(|(_, cell)| cell)
                .collect();
            *row = kept;
        }

        self.name_columns_by_header();
        Ok(remove.len())
    }

    // ===== Named Access =====

    /// Use the specified row as column headers.
    ///
    /// Rows above the header are dropped so the header becomes row 0.
    /// Duplicate names resolve to their first occurrence.
    pub fn name_columns_by_row(&mut self, row_index: usize) -> Result<()> {
        self.row(row_index)?;
        self.data.drain(..row_index);
        self.name_columns_by_header();
        Ok(())
    }

    fn name_columns_by_header(&mut self) {
        let Some(header_row) = self.data.first() else {
            self.column_names = None;
            self.column_index = None;
            return;
        };
        let names: Vec<String> = header_row.iter().map(CellValue::as_str).collect();

        let mut index_map = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            index_map.entry(name.clone()).or_insert(i);
        }

        self.column_names = Some(names);
        self.column_index = Some(index_map);
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Whether a column with this exact header exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index
            .as_ref()
            .is_some_and(|index| index.contains_key(name))
    }

    /// Header labels that are non-empty and unique, as structured tables require.
    ///
    /// Blank headers become `Unnamed: N`; repeats get `.1`, `.2`, ... suffixes.
    #[must_use]
    pub fn unique_header_labels(&self) -> Vec<String> {
        let names = self.column_names.clone().unwrap_or_default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut labels = Vec::with_capacity(names.len());

        for (i, name) in names.into_iter().enumerate() {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut label = base.clone();
            let mut n = 1;
            while !seen.insert(label.to_lowercase()) {
                label = format!("{base}.{n}");
                n += 1;
            }
            labels.push(label);
        }

        labels
    }

    /// Get the column index by name
    fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.column_index
            .as_ref()
            .ok_or_else(|| {
                SheetError::ColumnsNotNamed("Call name_columns_by_row() first".to_string())
            })?
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Get reference to underlying data
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable reference to underlying data.
    ///
    /// Callers replacing the header row should call `name_columns_by_row(0)` afterwards.
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
