use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use ontocell::jsonld::{convert_workbook, write_jsonld};
use ontocell::lims::{with_downloaded_dataset, PermId};

use super::Config;

/// Download a spreadsheet dataset and convert it to JSON-LD again
pub fn run(
    config: &Config,
    perm_id: String,
    output: Option<PathBuf>,
    store: Option<PathBuf>,
    token_file: Option<PathBuf>,
) -> Result<()> {
    let lims = super::open_lims(config, store, token_file)?;
    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.jsonld", perm_id)));
    let perm_id = PermId(perm_id);

    info!("Regenerating JSON-LD from dataset {}", perm_id);

    with_downloaded_dataset(&lims, &perm_id, |files| -> Result<()> {
        let workbook = files
            .iter()
            .find(|f| {
                f.extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"))
            })
            .with_context(|| format!("Dataset {} holds no .xlsx file", perm_id))?;

        let doc = convert_workbook(workbook)
            .with_context(|| format!("Conversion of {} failed", workbook.display()))?;
        write_jsonld(&doc, &output).context("Failed to write JSON-LD")?;
        Ok(())
    })?;

    println!("Wrote {}", output.display());
    Ok(())
}
