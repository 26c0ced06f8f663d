use std::collections::BTreeMap;

use super::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// Formula carried over from a source package, written back untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Formula {
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: String,
}

/// Presentation read from a source package: cell styles, formulas and row
/// attributes such as heights. Only consulted when the sheet is written back
/// into the package it came from.
#[derive(Debug, Clone, Default)]
pub(crate) struct SheetLayout {
    pub(crate) styles: BTreeMap<(usize, usize), String>,
    pub(crate) formulas: BTreeMap<(usize, usize), Formula>,
    pub(crate) row_attributes: BTreeMap<usize, Vec<(String, String)>>,
}

/// A named grid of cells addressed by 1-based (row, column).
///
/// Equality compares the name and the cell values only.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
    layout: SheetLayout,
}

impl PartialEq for Sheet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.rows == other.rows
    }
}

impl Sheet {
    /// Create an empty sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            layout: SheetLayout::default(),
        }
    }

    /// Create a sheet from rows; the first row lands in row 1
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
            layout: SheetLayout::default(),
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last row holding any cell (0 for an empty sheet)
    pub fn max_row(&self) -> usize {
        self.rows.len()
    }

    /// Widest row length
    pub fn max_col(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at (row, col); out-of-range cells read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        if row == 0 || col == 0 {
            return &EMPTY;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY)
    }

    /// Set the cell at (row, col), growing the grid as needed.
    ///
    /// Row and column indices are 1-based; index 0 is ignored. A formula read
    /// for this cell is dropped, its style is kept.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<CellValue>) {
        if row == 0 || col == 0 {
            return;
        }
        self.layout.formulas.remove(&(row, col));
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize_with(col, CellValue::default);
        }
        cells[col - 1] = value.into();
    }

    /// Column whose header (row 1) matches `header`, ignoring surrounding whitespace
    pub fn find_column(&self, header: &str) -> Option<usize> {
        let header = header.trim();
        self.rows.first().and_then(|cells| {
            cells
                .iter()
                .position(|c| c.as_str().map(str::trim) == Some(header))
                .map(|i| i + 1)
        })
    }

    /// All cells of a row, empty slice when the row is absent
    pub fn row(&self, row: usize) -> &[CellValue] {
        if row == 0 {
            return &[];
        }
        self.rows.get(row - 1).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Values of `col` for the data rows (2..=max_row)
    pub fn column_values(&self, col: usize) -> Vec<&CellValue> {
        (2..=self.max_row()).map(|row| self.cell(row, col)).collect()
    }

    /// Style index of a cell as read from the source package
    pub fn style(&self, row: usize, col: usize) -> Option<&str> {
        self.layout.styles.get(&(row, col)).map(String::as_str)
    }

    pub(crate) fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub(crate) fn layout_mut(&mut self) -> &mut SheetLayout {
        &mut self.layout
    }
}
