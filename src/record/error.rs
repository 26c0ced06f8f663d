/// Errors that can occur while loading or addressing an instrument record
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A path segment was missing, or addressed a value that is not an object
    #[error("Key lookup failed at segment '{segment}' of path '{path}'")]
    KeyLookup {
        /// Full path being resolved
        path: String,
        /// First segment that could not be followed
        segment: String,
    },

    /// I/O error reading the instrument file
    #[error("Failed to read instrument file: {0}")]
    IoError(#[from] std::io::Error),

    /// The instrument file is not valid JSON
    #[error("Invalid instrument JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The instrument file parsed, but its root is not an object
    #[error("Instrument record root must be a JSON object")]
    NotAnObject,
}
