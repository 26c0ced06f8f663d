use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use ontocell::pipeline::{Pipeline, PipelineSettings};
use ontocell::template::MergeStrategy;

use super::Config;

pub struct IngestArgs {
    pub folder: PathBuf,
    pub template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub token_file: Option<PathBuf>,
    pub space: Option<String>,
    pub project: Option<String>,
    pub experiment_type: Option<String>,
    pub by_label: bool,
}

/// Run the full pipeline on one experiment folder
pub fn run(config: &Config, args: IngestArgs) -> Result<()> {
    if !args.folder.is_dir() {
        anyhow::bail!("Input folder does not exist: {}", args.folder.display());
    }

    let template = args
        .template
        .or_else(|| config.ontology.template.clone())
        .context("No ontology template given (use --template or [ontology] template)")?;
    let space = args
        .space
        .or_else(|| config.lims.space.clone())
        .context("No LIMS space given (use --space or [lims] space)")?;
    let project = args
        .project
        .or_else(|| config.lims.project.clone())
        .context("No LIMS project given (use --project or [lims] project)")?;
    let experiment_type = args
        .experiment_type
        .or_else(|| config.lims.experiment_type.clone())
        .context("No experiment type given (use --experiment-type or [lims] experiment_type)")?;

    let mut settings = PipelineSettings::new(template, space, project, experiment_type);
    settings.output_dir = args.output_dir;
    settings.operators = config.operators.clone();
    if let Some(path) = &config.ontology.assembly_timestamp_path {
        settings.assembly_timestamp_path = path.clone();
    }
    settings.merge_strategy = if args.by_label {
        MergeStrategy::ByLabel
    } else {
        config.ontology.merge.unwrap_or_default()
    };

    info!("ontocell ingest");
    info!("===============");
    info!("Folder:   {}", args.folder.display());
    info!("Template: {}", settings.template.display());
    info!("Merge:    {:?}", settings.merge_strategy);

    let lims = super::open_lims(config, args.store, args.token_file)?;
    let mut pipeline = Pipeline::new(settings, lims);
    let outcome = pipeline
        .run(&args.folder)
        .with_context(|| format!("Ingestion of {} failed", args.folder.display()))?;

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", outcome.report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", outcome.report);
    }

    println!(
        "Experiment {} registered with {} properties",
        outcome.identifiers.experiment_identifier(),
        outcome.experiment.properties.len()
    );
    println!("Spreadsheet: {}", outcome.spreadsheet.display());
    println!("JSON-LD:     {}", outcome.jsonld.display());
    for perm_id in &outcome.datasets {
        println!("Dataset:     {}", perm_id);
    }

    Ok(())
}
