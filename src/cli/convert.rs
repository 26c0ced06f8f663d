use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use ontocell::jsonld::{convert_workbook, write_jsonld};

/// Convert a filled ontology workbook to JSON-LD
pub fn run(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let output = output.unwrap_or_else(|| input.with_extension("jsonld"));

    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());

    let doc = convert_workbook(&input)
        .with_context(|| format!("Conversion of {} failed", input.display()))?;
    write_jsonld(&doc, &output).context("Failed to write JSON-LD")?;

    println!("Wrote {}", output.display());
    Ok(())
}
