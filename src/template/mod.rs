//! # Ontology Template
//!
//! Filling the `Schema` sheet of the ontology template with curated metadata,
//! and overlaying a user-supplied override workbook onto the result.
//!
//! The `Schema` sheet layout is `Metadata | Value | Unit | Ontology link`, with
//! headers in row 1.

mod error;
mod merge;
mod report;
mod writer;

#[cfg(test)]
mod tests;

pub use error::TemplateError;
pub use merge::{merge, merge_with, merge_workbooks, MergeStrategy};
pub use report::{FieldWrite, WriteOutcome, WriteReport};
pub use writer::{fill_template, write_field, write_fields};

/// Name of the schema sheet
pub const SCHEMA_SHEET: &str = "Schema";

/// Header of the label column
pub const METADATA_HEADER: &str = "Metadata";

/// Header of the value column
pub const VALUE_HEADER: &str = "Value";

/// Header of the unit column
pub const UNIT_HEADER: &str = "Unit";

/// Header of the ontology link column
pub const ONTOLOGY_LINK_HEADER: &str = "Ontology link";

/// Fixed column of labels used by the template writer
pub const METADATA_COLUMN: usize = 1;

/// Fixed column of values used by the template writer
pub const VALUE_COLUMN: usize = 2;
