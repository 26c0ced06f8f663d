/// Errors that can occur while reading or writing a workbook
#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the ZIP container library
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Error parsing one of the XML parts
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// A part required by the package is missing
    #[error("Missing workbook part: {0}")]
    MissingPart(String),

    /// A cell reference or shared string index could not be interpreted
    #[error("Invalid cell data: {0}")]
    InvalidCell(String),

    /// The requested sheet does not exist
    #[error("Sheet not found: {0}")]
    MissingSheet(String),
}
