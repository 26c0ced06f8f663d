use crate::workbook::WorkbookError;

/// Errors raised while filling or merging ontology template workbooks
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A required header is absent from row 1 of a sheet
    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn {
        /// Sheet that was searched
        sheet: String,
        /// Header text that was expected
        column: String,
    },

    /// A required sheet is absent from a workbook
    #[error("Workbook has no '{0}' sheet")]
    MissingSheet(String),

    /// Error reading or writing the workbook file
    #[error("Workbook error: {0}")]
    WorkbookError(#[from] WorkbookError),
}
