use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use ontocell::template::{merge_workbooks, MergeStrategy};
use ontocell::workbook::Workbook;

use super::Config;

/// Overlay a custom metadata workbook onto a generated one
pub fn run(
    config: &Config,
    generated: PathBuf,
    custom: PathBuf,
    output: PathBuf,
    by_label: bool,
) -> Result<()> {
    let strategy = if by_label {
        MergeStrategy::ByLabel
    } else {
        config.ontology.merge.unwrap_or_default()
    };
    info!("Merging {} onto {} ({:?})", custom.display(), generated.display(), strategy);

    let generated_wb = Workbook::open(&generated)
        .with_context(|| format!("Failed to open {}", generated.display()))?;
    let custom_wb =
        Workbook::open(&custom).with_context(|| format!("Failed to open {}", custom.display()))?;

    let merged = merge_workbooks(&generated_wb, &custom_wb, strategy)?;
    merged
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}
