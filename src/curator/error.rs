/// Fatal errors raised while curating metadata
#[derive(Debug, thiserror::Error)]
pub enum CurateError {
    /// A field required to derive another field is absent from the record
    #[error("Required field '{0}' is missing from the instrument record")]
    MissingField(String),

    /// The cell identifier does not carry an operator short code
    #[error("Cell ID '{0}' has no operator code (expected <date>_<operator>_...)")]
    MalformedCellId(String),

    /// The assembly timestamp is absent or not in `YYYY-MM-DD HH:MM:SS` form
    #[error("Could not extract assembly date from '{path}': {reason}")]
    DateExtraction {
        /// Instrument path of the timestamp field
        path: String,
        /// What went wrong
        reason: String,
    },
}
