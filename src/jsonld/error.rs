use crate::workbook::WorkbookError;

/// Errors raised while building a JSON-LD document
#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    /// A link segment is neither `name` nor `rev|name` / `type|name`
    #[error("Invalid JSON-LD segment '{segment}' in '{link}'")]
    MalformedSegment {
        /// Offending raw segment
        segment: String,
        /// Whole link expression
        link: String,
    },

    /// A row carries a value but its Unit cell is empty
    #[error("The value '{0}' is filled in the wrong row, please check the schema")]
    MissingUnit(String),

    /// The unit label has no entry in the `Ontology - Unit` sheet
    #[error("Unit '{0}' has no ontology key")]
    UnknownUnit(String),

    /// A row carries a value but no ontology link
    #[error("Row '{0}' has a value but no ontology link")]
    MissingLink(String),

    /// A node on the path is not of the shape the step requires
    #[error("Cannot place '{segment}': {reason}")]
    UnexpectedNode {
        /// Segment being placed
        segment: String,
        /// What was found instead
        reason: String,
    },

    /// A field required for the document header is missing from the schema
    #[error("Missing information in the schema, please fill in the field '{0}'")]
    MissingField(String),

    /// A field required for the document header has no unique ID
    #[error("Missing unique ID for the field '{0}'")]
    MissingUniqueId(String),

    /// A required sheet is absent from the workbook
    #[error("Workbook has no '{0}' sheet")]
    MissingSheet(String),

    /// A required header is absent from a sheet
    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn {
        /// Sheet that was searched
        sheet: String,
        /// Header text that was expected
        column: String,
    },

    /// A schema row could not be placed; wraps the underlying cause
    #[error("Error occurred with value '{value}' and path '{path}': {source}")]
    Build {
        /// Cell value of the row
        value: String,
        /// Ontology link of the row
        path: String,
        /// Underlying cause
        #[source]
        source: Box<OntologyError>,
    },

    /// Error reading the workbook
    #[error("Workbook error: {0}")]
    WorkbookError(#[from] WorkbookError),

    /// I/O error writing the document
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}
