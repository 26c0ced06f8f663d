//! # Field Mapping Tables
//!
//! Static tables translating between the three naming schemes the pipeline
//! touches:
//!
//! 1. [`LIMS_PROPERTIES`]: LIMS property code ↔ instrument JSON path
//! 2. [`ONTOLOGY_FIELDS`]: ontology spreadsheet row label ↔ instrument JSON path
//!
//! The third mapping (schema row ↔ ontology link expression) lives in the
//! template workbook itself and is loaded by [`crate::jsonld::OntologyTables`].

mod lims;
mod ontology;

#[cfg(test)]
mod tests;

pub use lims::LIMS_PROPERTIES;
pub use ontology::{LABEL_ASSEMBLY_DATE, LABEL_CELL_ID, LABEL_OPERATOR, ONTOLOGY_FIELDS};

/// One row of the LIMS property table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Human-readable label
    pub label: &'static str,
    /// `||`-delimited path into the instrument record
    pub instrument_path: &'static str,
    /// Property code on the LIMS experiment type
    pub lims_code: &'static str,
}

/// One row of the ontology spreadsheet table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OntologyField {
    /// Label in the `Metadata` column of the `Schema` sheet
    pub label: &'static str,
    /// `||`-delimited path into the instrument record
    pub instrument_path: &'static str,
}

/// Find a LIMS mapping entry by property code
pub fn lims_property(code: &str) -> Option<&'static FieldMapping> {
    LIMS_PROPERTIES.iter().find(|m| m.lims_code == code)
}

/// Find an ontology field by spreadsheet label
pub fn ontology_field(label: &str) -> Option<&'static OntologyField> {
    ONTOLOGY_FIELDS.iter().find(|f| f.label == label)
}
