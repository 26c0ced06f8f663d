//! # JSON-LD Builder
//!
//! Turns a filled ontology workbook into a JSON-LD document rooted at the
//! battery cell.
//!
//! The workbook carries five sheets:
//!
//! - `Schema`: `Metadata | Value | Unit | Ontology link` rows
//! - `Ontology - Unit`: unit label → ontology unit key
//! - `@context-TopLevel`: entries of the document's local `@context`
//! - `@context-Connector`: intermediate nodes and the `@type` they carry
//! - `Unique ID`: identified entities and their IDs
//!
//! Each schema row with a value and a link is placed by interpreting its link
//! as a path of `-`-separated segments ([`LinkPath`]). See [`add_to_structure`]
//! for how segment position and unit decide what a row becomes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ontocell::jsonld::{convert_workbook, write_jsonld};
//!
//! let doc = convert_workbook("cell_ontology.xlsx")?;
//! write_jsonld(&doc, "cell.jsonld")?;
//! # Ok::<(), ontocell::jsonld::OntologyError>(())
//! ```

mod builder;
mod document;
mod error;
mod link;
mod tables;


pub use builder::add_to_structure;
pub use document::{
    build_document, convert_workbook, write_jsonld, BATTERY_CONTEXT, LABEL_CELL_TYPE,
    LABEL_INSTITUTION, LABEL_SCHEMA_VERSION,
};
pub use error::OntologyError;
pub use link::{LinkPath, Step, COMMENT, NOT_ONTOLOGIZE};
pub use tables::{
    OntologyTables, SchemaRow, Unit, CONTEXT_CONNECTOR_SHEET, CONTEXT_TOPLEVEL_SHEET, NO_UNIT,
    UNIQUE_ID_SHEET, UNIT_SHEET,
};
