//! # ontocell - Battery Cycling Metadata to Linked Data
//!
//! `ontocell` takes the JSON export of a battery cycling instrument and turns it
//! into two things: a property-annotated experiment in a laboratory information
//! management system (LIMS), and an ontology-aligned JSON-LD description of the
//! cell.
//!
//! ## Pipeline
//!
//! ```text
//! instrument JSON ─► record ─► curator ─► template writer ─► merge ─► jsonld ─► LIMS
//!                               │                              ▲
//!                               └── mapping tables      custom_metadata.xlsx
//! ```
//!
//! - [`record`]: delimited-path lookup into the instrument record
//! - [`mapping`]: static tables linking instrument paths, LIMS property codes
//!   and ontology spreadsheet labels
//! - [`curator`]: flat label → value dictionary with derived operator and date
//! - [`workbook`]: in-memory workbook and its `.xlsx` codec
//! - [`template`]: writing curated values into the `Schema` sheet, and merging
//!   user overrides
//! - [`jsonld`]: the ontology path interpreter that builds the JSON-LD document
//! - [`discovery`]: locating the inputs of an experiment folder
//! - [`lims`]: the LIMS collaborator and a filesystem-backed implementation
//! - [`pipeline`]: all of the above, end to end
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ontocell::lims::{read_token, LocalLims};
//! use ontocell::pipeline::{Pipeline, PipelineSettings};
//!
//! let token = read_token("lims.token")?;
//! let lims = LocalLims::open("lims-store", &token)?;
//! let settings = PipelineSettings::new("Schema_template.xlsx", "BATTERY", "PREMISE", "BATTERY_CELL");
//!
//! let mut pipeline = Pipeline::new(settings, lims);
//! let outcome = pipeline.run("runs/240906_KIGR_GEN4_01")?;
//! println!("JSON-LD written to {}", outcome.jsonld.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Converting a Workbook by Hand
//!
//! ```rust,no_run
//! use ontocell::jsonld::{convert_workbook, write_jsonld};
//!
//! let doc = convert_workbook("240906_KIGR_GEN4_01_ontology.xlsx")?;
//! write_jsonld(&doc, "240906_KIGR_GEN4_01.jsonld")?;
//! # Ok::<(), ontocell::jsonld::OntologyError>(())
//! ```

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod curator;
pub mod discovery;
pub mod jsonld;
pub mod lims;
pub mod mapping;
pub mod pipeline;
pub mod record;
pub mod template;
pub mod workbook;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::curator::{CurateError, CuratedMetadata, Curator};
    pub use crate::discovery::{discover, discover_with, Discovered, DiscoveryError};
    pub use crate::jsonld::{
        add_to_structure, build_document, convert_workbook, write_jsonld, LinkPath,
        OntologyError, OntologyTables, Unit,
    };
    pub use crate::lims::{
        read_token, register_experiment, with_downloaded_dataset, Identifiers, Lims, LimsError,
        LocalLims, PermId,
    };
    pub use crate::mapping::{FieldMapping, OntologyField, LIMS_PROPERTIES, ONTOLOGY_FIELDS};
    pub use crate::pipeline::{Pipeline, PipelineError, PipelineSettings, RunOutcome};
    pub use crate::record::{resolve, InstrumentRecord, ResolveError, PATH_DELIMITER};
    pub use crate::template::{
        fill_template, merge, merge_with, merge_workbooks, write_field, MergeStrategy,
        TemplateError, WriteOutcome, WriteReport,
    };
    pub use crate::workbook::{CellValue, Sheet, Workbook, WorkbookError};
}
