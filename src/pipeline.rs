//! End-to-end ingestion of one experiment folder.
//!
//! Stages run in order and each one consumes the previous one's output:
//!
//! 1. discover the inputs of the folder
//! 2. load the instrument record and curate it
//! 3. copy the ontology template and write the curated fields into it
//! 4. overlay the user override workbook, if there is one
//! 5. build the JSON-LD document and persist it
//! 6. register the experiment and upload the run's files as datasets
//!
//! A fatal error in stages 1-5 leaves no JSON-LD file behind. Uploads done
//! before a failure in stage 6 are not rolled back.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::curator::{CurateError, CuratedMetadata, Curator, DEFAULT_ASSEMBLY_TIMESTAMP_PATH};
use crate::discovery::{discover_with, DiscoveryError, DEFAULT_RAW_EXTENSIONS};
use crate::jsonld::{convert_workbook, write_jsonld, OntologyError};
use crate::lims::{
    register_experiment, upload_dataset, Experiment, Identifiers, Lims, LimsError, PermId,
    DATASET_INSTRUMENT_JSON, DATASET_JSONLD, DATASET_ONTOLOGY_SPREADSHEET, DATASET_RAW_DATA,
};
use crate::record::{InstrumentRecord, ResolveError};
use crate::template::{fill_template, merge_workbooks, MergeStrategy, TemplateError, WriteReport};
use crate::workbook::{Workbook, WorkbookError};

/// Errors that abort a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The folder does not hold a usable set of inputs
    #[error("Input discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The instrument record could not be loaded
    #[error("Instrument record error: {0}")]
    Record(#[from] ResolveError),

    /// A load-bearing field could not be derived
    #[error("Curation failed: {0}")]
    Curate(#[from] CurateError),

    /// The template could not be filled or merged
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// A workbook could not be read or written
    #[error("Workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    /// The JSON-LD document could not be built or written
    #[error("JSON-LD build failed: {0}")]
    Ontology(#[from] OntologyError),

    /// The LIMS refused the experiment or a dataset
    #[error("LIMS error: {0}")]
    Lims(#[from] LimsError),

    /// I/O error preparing the output directory
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Settings for one pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Ontology template workbook
    pub template: PathBuf,
    /// Where the filled workbook and the JSON-LD go (the input folder when `None`)
    pub output_dir: Option<PathBuf>,
    /// LIMS space code
    pub space: String,
    /// LIMS project code
    pub project: String,
    /// LIMS experiment type code
    pub experiment_type: String,
    /// Instrument path of the assembly timestamp
    pub assembly_timestamp_path: String,
    /// How the override workbook is aligned with the generated one
    pub merge_strategy: MergeStrategy,
    /// Operator short code → full name
    pub operators: HashMap<String, String>,
    /// Extensions of raw data files to upload
    pub raw_extensions: Vec<String>,
}

impl PipelineSettings {
    /// Settings with defaults for everything but the template and LIMS addressing
    pub fn new(
        template: impl Into<PathBuf>,
        space: impl Into<String>,
        project: impl Into<String>,
        experiment_type: impl Into<String>,
    ) -> Self {
        Self {
            template: template.into(),
            output_dir: None,
            space: space.into(),
            project: project.into(),
            experiment_type: experiment_type.into(),
            assembly_timestamp_path: DEFAULT_ASSEMBLY_TIMESTAMP_PATH.to_string(),
            merge_strategy: MergeStrategy::default(),
            operators: HashMap::new(),
            raw_extensions: DEFAULT_RAW_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Addressing triple of the registered experiment
    pub identifiers: Identifiers,
    /// Curated metadata written into the template
    pub metadata: CuratedMetadata,
    /// Per-field outcome of the template writes
    pub report: WriteReport,
    /// Filled (and merged) ontology workbook
    pub spreadsheet: PathBuf,
    /// Persisted JSON-LD document
    pub jsonld: PathBuf,
    /// The registered experiment
    pub experiment: Experiment,
    /// Permanent IDs of the uploaded datasets, in upload order
    pub datasets: Vec<PermId>,
}

/// Ingestion pipeline bound to one LIMS session
pub struct Pipeline<L: Lims> {
    settings: PipelineSettings,
    lims: L,
}

impl<L: Lims> Pipeline<L> {
    /// Create a pipeline
    pub fn new(settings: PipelineSettings, lims: L) -> Self {
        Self { settings, lims }
    }

    /// Pipeline settings
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// The LIMS session
    pub fn lims(&self) -> &L {
        &self.lims
    }

    /// Give back the LIMS session
    pub fn into_lims(self) -> L {
        self.lims
    }

    /// Process one experiment folder
    pub fn run<P: AsRef<Path>>(&mut self, folder: P) -> Result<RunOutcome, PipelineError> {
        let folder = folder.as_ref();
        let settings = &self.settings;
        info!("Processing {}", folder.display());

        let inputs = discover_with(folder, settings.raw_extensions.as_slice())?;
        let record = InstrumentRecord::from_file(&inputs.instrument_json)?;

        let metadata = Curator::default()
            .with_user_names(&settings.operators)
            .with_assembly_timestamp_path(settings.assembly_timestamp_path.as_str())
            .curate(&record)?;

        let output_dir = settings
            .output_dir
            .clone()
            .unwrap_or_else(|| folder.to_path_buf());
        fs::create_dir_all(&output_dir)?;
        let code = &inputs.experiment_code;
        let spreadsheet = output_dir.join(format!("{}_ontology.xlsx", code));
        let jsonld = output_dir.join(format!("{}.jsonld", code));

        let report = fill_template(&settings.template, &spreadsheet, &metadata)?;
        info!("{}", report);

        if let Some(custom) = &inputs.custom_metadata {
            info!("Applying custom metadata from {}", custom.display());
            let generated = Workbook::open(&spreadsheet)?;
            let overrides = Workbook::open(custom)?;
            merge_workbooks(&generated, &overrides, settings.merge_strategy)?.save(&spreadsheet)?;
        }

        let document = convert_workbook(&spreadsheet)?;
        write_jsonld(&document, &jsonld)?;

        let identifiers = Identifiers::new(&settings.space, &settings.project, code.as_str());
        let experiment =
            register_experiment(&mut self.lims, &identifiers, &settings.experiment_type, &record)?;

        let mut uploads = vec![(DATASET_INSTRUMENT_JSON, vec![inputs.instrument_json.clone()])];
        if !inputs.raw_files.is_empty() {
            uploads.push((DATASET_RAW_DATA, inputs.raw_files.clone()));
        }
        uploads.push((DATASET_ONTOLOGY_SPREADSHEET, vec![spreadsheet.clone()]));
        uploads.push((DATASET_JSONLD, vec![jsonld.clone()]));

        let mut datasets = Vec::with_capacity(uploads.len());
        for (dataset_type, files) in uploads {
            datasets.push(upload_dataset(&mut self.lims, &identifiers, dataset_type, &files)?);
        }

        info!(
            "Finished {}: {} dataset(s) uploaded",
            identifiers.experiment_identifier(),
            datasets.len()
        );

        Ok(RunOutcome {
            identifiers,
            metadata,
            report,
            spreadsheet,
            jsonld,
            experiment,
            datasets,
        })
    }
}
