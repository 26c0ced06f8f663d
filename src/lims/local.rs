//! Filesystem-backed LIMS.
//!
//! Layout under the store root:
//!
//! ```text
//! experiments/<SPACE>/<PROJECT>/<EXPERIMENT>.json
//! datasets/<PERM_ID>/dataset.json
//! datasets/<PERM_ID>/files/<file name>
//! property_types/<CODE>.json
//! experiment_types/<TYPE>.json
//! ```
//!
//! Every code and permanent ID must be a single plain path component.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Dataset, Experiment, Identifiers, Lims, LimsError, PermId, PropertyType};

const EXPERIMENTS_DIR: &str = "experiments";
const DATASETS_DIR: &str = "datasets";
const PROPERTY_TYPES_DIR: &str = "property_types";
const EXPERIMENT_TYPES_DIR: &str = "experiment_types";
const FILES_DIR: &str = "files";
const DATASET_RECORD: &str = "dataset.json";

/// Stored description of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Permanent ID
    pub perm_id: PermId,
    /// Dataset type code
    pub dataset_type: String,
    /// Identifier of the owning experiment
    pub experiment: String,
    /// Stored file names
    pub files: Vec<String>,
    /// When the dataset was saved
    pub registered_at: DateTime<Utc>,
}

/// LIMS session over a local directory tree
#[derive(Debug, Clone)]
pub struct LocalLims {
    root: PathBuf,
    property_codes: Option<HashSet<String>>,
}

impl LocalLims {
    /// Open (creating if needed) a store at `root`, authenticating with `token`
    pub fn open<P: AsRef<Path>>(root: P, token: &str) -> Result<Self, LimsError> {
        if token.trim().is_empty() {
            return Err(LimsError::Authentication("empty access token".to_string()));
        }
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(EXPERIMENTS_DIR))?;
        fs::create_dir_all(root.join(DATASETS_DIR))?;
        info!("Opened LIMS store at {}", root.display());
        Ok(Self {
            root,
            property_codes: None,
        })
    }

    /// Only accept these property codes, like an experiment type with a fixed
    /// property list
    pub fn with_property_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    /// Store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn experiment_path(&self, identifiers: &Identifiers) -> Result<PathBuf, LimsError> {
        Ok(self
            .root
            .join(EXPERIMENTS_DIR)
            .join(code_component(&identifiers.space_code)?)
            .join(code_component(&identifiers.project_code)?)
            .join(format!("{}.json", code_component(&identifiers.experiment_code)?)))
    }

    fn dataset_dir(&self, perm_id: &PermId) -> Result<PathBuf, LimsError> {
        let id = path_component(perm_id.as_str())
            .ok_or_else(|| LimsError::InvalidPermId(perm_id.to_string()))?;
        Ok(self.root.join(DATASETS_DIR).join(id))
    }

    fn record_path(&self, dir: &str, code: &str) -> Result<PathBuf, LimsError> {
        Ok(self
            .root
            .join(dir)
            .join(format!("{}.json", code_component(code)?)))
    }

    /// Read back a saved experiment
    pub fn load_experiment(
        &self,
        identifiers: &Identifiers,
    ) -> Result<Option<Experiment>, LimsError> {
        let path = self.experiment_path(identifiers)?;
        if !path.is_file() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    /// Read back a saved dataset record
    pub fn load_dataset(&self, perm_id: &PermId) -> Result<DatasetRecord, LimsError> {
        let path = self.dataset_dir(perm_id)?.join(DATASET_RECORD);
        if !path.is_file() {
            return Err(LimsError::DatasetNotFound(perm_id.to_string()));
        }
        read_json(&path)
    }

    /// Property types assigned to an experiment type, in assignment order
    pub fn property_types(&self, experiment_type: &str) -> Result<Vec<PropertyType>, LimsError> {
        let path = self.record_path(EXPERIMENT_TYPES_DIR, experiment_type)?;
        if !path.is_file() {
            return Ok(Vec::new());
        }
        read_json(&path)
    }
}

/// `value` when it names exactly one plain path component
fn path_component(value: &str) -> Option<&str> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == value => Some(value),
        _ => None,
    }
}

fn code_component(code: &str) -> Result<&str, LimsError> {
    path_component(code).ok_or_else(|| LimsError::InvalidCode(code.to_string()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, LimsError> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| LimsError::CorruptRecord {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), LimsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

impl Lims for LocalLims {
    fn new_experiment(
        &mut self,
        identifiers: &Identifiers,
        experiment_type: &str,
    ) -> Result<Experiment, LimsError> {
        self.experiment_path(identifiers)?;
        code_component(experiment_type)?;
        debug!(
            "New {} experiment {}",
            experiment_type,
            identifiers.experiment_identifier()
        );
        Ok(Experiment {
            identifiers: identifiers.clone(),
            experiment_type: experiment_type.to_string(),
            properties: BTreeMap::new(),
        })
    }

    fn set_property(
        &mut self,
        experiment: &mut Experiment,
        code: &str,
        value: &Value,
    ) -> Result<(), LimsError> {
        let reject = |reason: &str| LimsError::PropertyRejected {
            code: code.to_string(),
            reason: reason.to_string(),
        };
        if let Some(codes) = &self.property_codes {
            if !codes.contains(code) {
                return Err(reject("not a property of this experiment type"));
            }
        }
        match value {
            Value::Null => return Err(reject("value is empty")),
            Value::Array(_) | Value::Object(_) => return Err(reject("value is not a scalar")),
            _ => {}
        }
        let assigned = self.property_types(&experiment.experiment_type)?;
        if let Some(property) = assigned.iter().find(|p| p.code == code) {
            if !property.data_type.accepts(value) {
                return Err(reject(&format!("{} is not a {} value", value, property.data_type)));
            }
        }
        experiment.properties.insert(code.to_string(), value.clone());
        Ok(())
    }

    fn save_experiment(&mut self, experiment: &Experiment) -> Result<(), LimsError> {
        let path = self.experiment_path(&experiment.identifiers)?;
        if path.exists() {
            info!(
                "Overwriting experiment {}",
                experiment.identifiers.experiment_identifier()
            );
        }
        write_json(&path, experiment)
    }

    fn new_dataset(
        &mut self,
        dataset_type: &str,
        experiment: &Identifiers,
        files: &[PathBuf],
    ) -> Result<Dataset, LimsError> {
        if files.is_empty() {
            return Err(LimsError::EmptyDataset(dataset_type.to_string()));
        }
        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            return Err(LimsError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", missing.display()),
            )));
        }
        Ok(Dataset {
            dataset_type: dataset_type.to_string(),
            experiment: experiment.experiment_identifier(),
            files: files.to_vec(),
        })
    }

    fn save_dataset(&mut self, dataset: Dataset) -> Result<PermId, LimsError> {
        let perm_id = PermId(Uuid::new_v4().to_string());
        let dataset_dir = self.dataset_dir(&perm_id)?;
        let files_dir = dataset_dir.join(FILES_DIR);
        fs::create_dir_all(&files_dir)?;

        let mut names = Vec::with_capacity(dataset.files.len());
        for file in &dataset.files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("{} has no file name", file.display()),
                    )
                })?;
            fs::copy(file, files_dir.join(&name))?;
            names.push(name);
        }

        let record = DatasetRecord {
            perm_id: perm_id.clone(),
            dataset_type: dataset.dataset_type,
            experiment: dataset.experiment,
            files: names,
            registered_at: Utc::now(),
        };
        write_json(&dataset_dir.join(DATASET_RECORD), &record)?;
        debug!("Saved dataset {} ({} files)", perm_id, record.files.len());
        Ok(perm_id)
    }

    fn download_dataset(
        &self,
        perm_id: &PermId,
        destination: &Path,
    ) -> Result<Vec<PathBuf>, LimsError> {
        let record = self.load_dataset(perm_id)?;
        let files_dir = self.dataset_dir(perm_id)?.join(FILES_DIR);
        fs::create_dir_all(destination)?;

        let mut downloaded = Vec::with_capacity(record.files.len());
        for name in &record.files {
            let target = destination.join(name);
            fs::copy(files_dir.join(name), &target)?;
            downloaded.push(target);
        }
        Ok(downloaded)
    }
    fn new_property_type(
        &mut self,
        property: &PropertyType,
        experiment_type: &str,
    ) -> Result<(), LimsError> {
        let definition = self.record_path(PROPERTY_TYPES_DIR, &property.code)?;
        let assignments = self.record_path(EXPERIMENT_TYPES_DIR, experiment_type)?;

        if definition.is_file() {
            let existing: PropertyType = read_json(&definition)?;
            if existing != *property {
                return Err(LimsError::PropertyRejected {
                    code: property.code.clone(),
                    reason: format!("already defined as {}", existing.data_type),
                });
            }
        } else {
            write_json(&definition, property)?;
            info!("Created {} property type {}", property.data_type, property.code);
        }

        let mut assigned = self.property_types(experiment_type)?;
        if assigned.iter().any(|p| p.code == property.code) {
            debug!("{} already carries {}", experiment_type, property.code);
        } else {
            assigned.push(property.clone());
            write_json(&assignments, &assigned)?;
            info!("Assigned {} to experiment type {}", property.code, experiment_type);
        }

        if let Some(codes) = self.property_codes.as_mut() {
            codes.insert(property.code.clone());
        }
        Ok(())
    }
}
