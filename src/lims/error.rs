use std::path::PathBuf;

/// Errors raised by the LIMS collaborator
#[derive(Debug, thiserror::Error)]
pub enum LimsError {
    /// The credential file holds no token
    #[error("Credential file {0} does not contain a token")]
    EmptyToken(PathBuf),

    /// The session could not be opened
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A property write was refused
    #[error("Property '{code}' rejected: {reason}")]
    PropertyRejected {
        /// Property code on the experiment type
        code: String,
        /// Why the value was refused
        reason: String,
    },

    /// A dataset was created without files
    #[error("Dataset of type '{0}' has no files")]
    EmptyDataset(String),

    /// A permanent ID that cannot name a dataset, such as one containing a path separator
    #[error("Invalid dataset permanent ID '{0}'")]
    InvalidPermId(String),

    /// A space, project, experiment or type code that cannot name a store entry
    #[error("Invalid code '{0}'")]
    InvalidCode(String),

    /// The session does not support the operation
    #[error("Operation not supported by this LIMS: {0}")]
    Unsupported(String),

    /// No dataset carries the requested permanent ID
    #[error("Dataset '{0}' not found")]
    DatasetNotFound(String),

    /// A record in the store could not be read back
    #[error("Corrupt LIMS record {path}: {reason}")]
    CorruptRecord {
        /// Record file
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// I/O error talking to the store
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}
