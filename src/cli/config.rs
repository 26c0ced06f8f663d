//! TOML configuration file support.
//!
//! Settings that rarely change between runs live in a config file instead of
//! on the command line. Flags override the file.
//!
//! ```toml
//! # ontocell.toml
//! [lims]
//! store = "/srv/lims"
//! token_file = "~/.lims_token"
//! space = "BATTERY"
//! project = "PREMISE"
//! experiment_type = "BATTERY_CELL"
//!
//! [ontology]
//! template = "templates/Schema_template.xlsx"
//! assembly_timestamp_path = "metadata||sample_data||Assembly timestamp"
//! merge = "by-label"
//!
//! [operators]
//! KIGR = "Kirsten Grossmann"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ontocell::template::MergeStrategy;

/// Root configuration structure for ontocell.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// LIMS connection and addressing.
    #[serde(default)]
    pub lims: LimsConfig,

    /// Ontology template and conversion settings.
    #[serde(default)]
    pub ontology: OntologyConfig,

    /// Operator short code to full name.
    #[serde(default)]
    pub operators: HashMap<String, String>,
}

/// Configuration of the LIMS session.
#[derive(Debug, Default, Deserialize)]
pub struct LimsConfig {
    /// Root directory of the LIMS store.
    pub store: Option<PathBuf>,

    /// File holding the access token.
    pub token_file: Option<PathBuf>,

    /// Space code.
    pub space: Option<String>,

    /// Project code.
    pub project: Option<String>,

    /// Experiment type code.
    pub experiment_type: Option<String>,
}

/// Configuration of the ontology stages.
#[derive(Debug, Default, Deserialize)]
pub struct OntologyConfig {
    /// Ontology template workbook.
    pub template: Option<PathBuf>,

    /// Instrument path of the assembly timestamp.
    pub assembly_timestamp_path: Option<String>,

    /// Alignment of the custom metadata workbook.
    pub merge: Option<MergeStrategy>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
