//! # LIMS Collaborator
//!
//! The laboratory information management system stores one experiment per
//! cell, its mapped properties, and the files of the run as datasets.
//!
//! The pipeline only talks to the [`Lims`] trait. [`LocalLims`] implements it
//! over a directory tree so a run can be registered without a server.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ontocell::lims::{read_token, register_experiment, Identifiers, LocalLims};
//! use ontocell::record::InstrumentRecord;
//!
//! let token = read_token("lims.token")?;
//! let mut lims = LocalLims::open("/srv/lims", &token)?;
//! let ids = Identifiers::new("BATTERY", "PREMISE", "240906_KIGR_GEN4_01");
//! let record = InstrumentRecord::from_file("cycle.240906_KIGR_GEN4_01.json")?;
//! let experiment = register_experiment(&mut lims, &ids, "BATTERY_CELL", &record)?;
//! println!("{} properties set", experiment.properties.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod local;


use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::TempDir;

use crate::mapping::{FieldMapping, LIMS_PROPERTIES};
use crate::record::InstrumentRecord;

pub use error::LimsError;
pub use local::{DatasetRecord, LocalLims};

/// Dataset type of the instrument export
pub const DATASET_INSTRUMENT_JSON: &str = "INSTRUMENT_JSON";
/// Dataset type of raw cycling data
pub const DATASET_RAW_DATA: &str = "RAW_DATA";
/// Dataset type of the filled ontology workbook
pub const DATASET_ONTOLOGY_SPREADSHEET: &str = "ONTOLOGY_SPREADSHEET";
/// Dataset type of the JSON-LD document
pub const DATASET_JSONLD: &str = "ONTOLOGY_JSONLD";

/// Addressing triple of an experiment.
///
/// Built once per run and passed explicitly to every call that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifiers {
    /// Space code
    pub space_code: String,
    /// Project code inside the space
    pub project_code: String,
    /// Experiment code inside the project
    pub experiment_code: String,
}

impl Identifiers {
    /// Create a new addressing triple
    pub fn new(
        space_code: impl Into<String>,
        project_code: impl Into<String>,
        experiment_code: impl Into<String>,
    ) -> Self {
        Self {
            space_code: space_code.into(),
            project_code: project_code.into(),
            experiment_code: experiment_code.into(),
        }
    }

    /// `/SPACE/PROJECT`
    pub fn project_identifier(&self) -> String {
        format!("/{}/{}", self.space_code, self.project_code)
    }

    /// `/SPACE/PROJECT/EXPERIMENT`
    pub fn experiment_identifier(&self) -> String {
        format!("{}/{}", self.project_identifier(), self.experiment_code)
    }
}

/// An experiment record being built or already stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Where the experiment lives
    pub identifiers: Identifiers,
    /// Experiment type code
    pub experiment_type: String,
    /// Property code → value
    pub properties: BTreeMap<String, Value>,
}

/// A dataset waiting to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Dataset type code
    pub dataset_type: String,
    /// Identifier of the owning experiment
    pub experiment: String,
    /// Files to upload
    pub files: Vec<PathBuf>,
}

/// Permanent identifier assigned to a saved dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermId(pub String);

impl PermId {
    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermId {
    fn from(s: &str) -> Self {
        PermId(s.to_string())
    }
}

/// Value type of a property type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// Single-line text
    Varchar,
    /// Free text
    MultilineVarchar,
    /// Whole number
    Integer,
    /// Floating point number
    Real,
    /// True or false
    Boolean,
    /// RFC 3339 or `YYYY-MM-DD HH:MM:SS` date and time
    Timestamp,
}

impl DataType {
    /// Whether `value` can be stored in a property of this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            DataType::Varchar | DataType::MultilineVarchar => {
                matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
            }
            DataType::Integer => value.is_i64() || value.is_u64(),
            DataType::Real => value.is_number(),
            DataType::Boolean => value.is_boolean(),
            DataType::Timestamp => value.as_str().is_some_and(|s| {
                chrono::DateTime::parse_from_rfc3339(s).is_ok()
                    || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
            }),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Varchar => "VARCHAR",
            DataType::MultilineVarchar => "MULTILINE_VARCHAR",
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
            DataType::Boolean => "BOOLEAN",
            DataType::Timestamp => "TIMESTAMP",
        };
        f.write_str(name)
    }
}

/// Definition of a property that experiment types can carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    /// Unique property code
    pub code: String,
    /// Human-readable label
    pub label: String,
    /// What the property records
    pub description: String,
    /// Value type
    pub data_type: DataType,
}

impl PropertyType {
    /// Create a property type definition
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            description: description.into(),
            data_type,
        }
    }
}

/// Operations the pipeline needs from a LIMS session
pub trait Lims {
    /// Start a new experiment record (not yet persisted)
    fn new_experiment(
        &mut self,
        identifiers: &Identifiers,
        experiment_type: &str,
    ) -> Result<Experiment, LimsError>;

    /// Set one property on an experiment
    fn set_property(
        &mut self,
        experiment: &mut Experiment,
        code: &str,
        value: &Value,
    ) -> Result<(), LimsError>;

    /// Persist an experiment record
    fn save_experiment(&mut self, experiment: &Experiment) -> Result<(), LimsError>;

    /// Start a new dataset attached to `experiment` (not yet persisted)
    fn new_dataset(
        &mut self,
        dataset_type: &str,
        experiment: &Identifiers,
        files: &[PathBuf],
    ) -> Result<Dataset, LimsError>;

    /// Upload a dataset and return its permanent ID
    fn save_dataset(&mut self, dataset: Dataset) -> Result<PermId, LimsError>;

    /// Download the files of a dataset into `destination`
    fn download_dataset(
        &self,
        perm_id: &PermId,
        destination: &Path,
    ) -> Result<Vec<PathBuf>, LimsError>;

    /// Create a property type and assign it to `experiment_type`.
    ///
    /// Sessions without schema rights refuse with [`LimsError::Unsupported`].
    fn new_property_type(
        &mut self,
        property: &PropertyType,
        _experiment_type: &str,
    ) -> Result<(), LimsError> {
        Err(LimsError::Unsupported(format!(
            "creating property type '{}'",
            property.code
        )))
    }
}

/// Read an access token from a credential file.
///
/// Surrounding whitespace is stripped.
pub fn read_token<P: AsRef<Path>>(path: P) -> Result<String, LimsError> {
    let path = path.as_ref();
    let token = fs::read_to_string(path)?.trim().to_string();
    if token.is_empty() {
        return Err(LimsError::EmptyToken(path.to_path_buf()));
    }
    Ok(token)
}

/// Create the experiment for a run and copy every mapped instrument field
/// onto it as a property.
///
/// Fields missing from the record and property writes the LIMS refuses are
/// logged and skipped. Only creating or saving the experiment itself fails
/// the call.
pub fn register_experiment<L: Lims + ?Sized>(
    lims: &mut L,
    identifiers: &Identifiers,
    experiment_type: &str,
    record: &InstrumentRecord,
) -> Result<Experiment, LimsError> {
    register_experiment_with(lims, identifiers, experiment_type, record, LIMS_PROPERTIES)
}

/// [`register_experiment`] over an explicit mapping table
pub fn register_experiment_with<L: Lims + ?Sized>(
    lims: &mut L,
    identifiers: &Identifiers,
    experiment_type: &str,
    record: &InstrumentRecord,
    mappings: &[FieldMapping],
) -> Result<Experiment, LimsError> {
    let mut experiment = lims.new_experiment(identifiers, experiment_type)?;

    for mapping in mappings {
        let Some(value) = record.lookup(mapping.instrument_path) else {
            warn!(
                "'{}' not found in instrument record ({}), skipping",
                mapping.label, mapping.instrument_path
            );
            continue;
        };
        match lims.set_property(&mut experiment, mapping.lims_code, value) {
            Ok(()) => debug!("Set '{}' = {}", mapping.lims_code, value),
            Err(e) => warn!("Could not set '{}': {}", mapping.lims_code, e),
        }
    }

    lims.save_experiment(&experiment)?;
    info!(
        "Registered experiment {} with {} of {} properties",
        identifiers.experiment_identifier(),
        experiment.properties.len(),
        mappings.len()
    );
    Ok(experiment)
}

/// Create and save one dataset, returning its permanent ID
pub fn upload_dataset<L: Lims + ?Sized>(
    lims: &mut L,
    identifiers: &Identifiers,
    dataset_type: &str,
    files: &[PathBuf],
) -> Result<PermId, LimsError> {
    let dataset = lims.new_dataset(dataset_type, identifiers, files)?;
    let perm_id = lims.save_dataset(dataset)?;
    info!("Uploaded {} dataset {}", dataset_type, perm_id);
    Ok(perm_id)
}

/// Download a dataset into a temporary directory and run `op` on its files.
///
/// The directory is removed when this returns, whatever `op` returned.
pub fn with_downloaded_dataset<L, T, E, F>(lims: &L, perm_id: &PermId, op: F) -> Result<T, E>
where
    L: Lims + ?Sized,
    E: From<LimsError>,
    F: FnOnce(&[PathBuf]) -> Result<T, E>,
{
    let dir = TempDir::new().map_err(LimsError::from)?;
    let files = lims.download_dataset(perm_id, dir.path())?;
    debug!(
        "Downloaded {} file(s) of dataset {} to {}",
        files.len(),
        perm_id,
        dir.path().display()
    );
    op(&files)
}
