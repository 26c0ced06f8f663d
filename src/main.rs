//! # ontocell
//!
//! Command-line driver for the battery metadata pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Process an experiment folder end to end
//! ontocell --config ontocell.toml ingest runs/240906_KIGR_GEN4_01
//!
//! # Convert a filled ontology workbook
//! ontocell convert 240906_KIGR_GEN4_01_ontology.xlsx -o cell.jsonld
//!
//! # Overlay user overrides onto a generated workbook
//! ontocell merge generated.xlsx my_custom_metadata.xlsx -o merged.xlsx --by-label
//!
//! # Rebuild JSON-LD from a spreadsheet stored in the LIMS
//! ontocell --config ontocell.toml regenerate 5f0c9d8e-... -o cell.jsonld
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
