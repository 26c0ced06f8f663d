//! # Workbook Model
//!
//! In-memory workbook used by the template writer, the merge stage and the
//! JSON-LD builder, with an `.xlsx` codec in [`xlsx`].

mod cell;
mod error;
mod sheet;
pub mod xlsx;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;

pub use cell::{column_letters, parse_cell_ref, CellValue, MAX_COLS, MAX_ROWS};
pub use error::WorkbookError;
pub use sheet::Sheet;

/// Ordered collection of named sheets.
///
/// A workbook read from a file remembers the package it came from, so saving
/// it keeps styles, column widths, validations, merged cells and defined names.
/// Equality compares the sheets only.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    package: Option<Arc<xlsx::Package>>,
}

impl PartialEq for Workbook {
    fn eq(&self, other: &Self) -> bool {
        self.sheets == other.sheets
    }
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an `.xlsx` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WorkbookError> {
        xlsx::read(path)
    }

    /// Write this workbook as an `.xlsx` file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WorkbookError> {
        xlsx::write(self, path)
    }

    /// Add a sheet, replacing any existing sheet of the same name
    pub fn add_sheet(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|s| s.name() == sheet.name()) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    /// Sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Mutable sheet by name
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Sheet by name, or [`WorkbookError::MissingSheet`]
    pub fn require_sheet(&self, name: &str) -> Result<&Sheet, WorkbookError> {
        self.sheet(name)
            .ok_or_else(|| WorkbookError::MissingSheet(name.to_string()))
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(Sheet::name)
    }

    /// All sheets in workbook order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Whether saving writes back into the package this workbook was read from
    pub fn has_source_package(&self) -> bool {
        self.package.is_some()
    }

    pub(crate) fn package(&self) -> Option<&xlsx::Package> {
        self.package.as_deref()
    }

    pub(crate) fn set_package(&mut self, package: xlsx::Package) {
        self.package = Some(Arc::new(package));
    }
}
