use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod convert;
mod ingest;
mod merge;
mod regenerate;

pub use config::Config;

/// ontocell - Battery cycling metadata to LIMS records and JSON-LD
#[derive(Parser)]
#[command(name = "ontocell")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an experiment folder end to end
    Ingest {
        /// Folder holding <cycle>.<experiment_code>.json and its data files
        #[arg(value_name = "FOLDER")]
        folder: PathBuf,

        /// Ontology template workbook
        #[arg(short = 't', long, value_name = "XLSX")]
        template: Option<PathBuf>,

        /// Directory for the filled workbook and the JSON-LD (defaults to FOLDER)
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Root of the LIMS store
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,

        /// File holding the LIMS access token
        #[arg(long, value_name = "FILE")]
        token_file: Option<PathBuf>,

        /// LIMS space code
        #[arg(long)]
        space: Option<String>,

        /// LIMS project code
        #[arg(long)]
        project: Option<String>,

        /// LIMS experiment type code
        #[arg(long)]
        experiment_type: Option<String>,

        /// Align custom metadata by Metadata label instead of row position
        #[arg(long)]
        by_label: bool,
    },

    /// Convert a filled ontology workbook to JSON-LD
    Convert {
        /// Input workbook
        #[arg(value_name = "XLSX")]
        input: PathBuf,

        /// Output JSON-LD path (defaults to the input with a .jsonld extension)
        #[arg(short = 'o', long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Overlay a custom metadata workbook onto a generated one
    Merge {
        /// Generated workbook
        #[arg(value_name = "AUTO")]
        generated: PathBuf,

        /// Custom metadata workbook
        #[arg(value_name = "CUSTOM")]
        custom: PathBuf,

        /// Merged workbook path
        #[arg(short = 'o', long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Align by Metadata label instead of row position
        #[arg(long)]
        by_label: bool,
    },

    /// Download a spreadsheet dataset from the LIMS and convert it again
    Regenerate {
        /// Permanent ID of the spreadsheet dataset
        #[arg(value_name = "PERM_ID")]
        perm_id: String,

        /// Output JSON-LD path (defaults to <PERM_ID>.jsonld)
        #[arg(short = 'o', long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Root of the LIMS store
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,

        /// File holding the LIMS access token
        #[arg(long, value_name = "FILE")]
        token_file: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest {
            folder,
            template,
            output_dir,
            store,
            token_file,
            space,
            project,
            experiment_type,
            by_label,
        } => ingest::run(
            &config,
            ingest::IngestArgs {
                folder,
                template,
                output_dir,
                store,
                token_file,
                space,
                project,
                experiment_type,
                by_label,
            },
        ),
        Commands::Convert { input, output } => convert::run(input, output),
        Commands::Merge {
            generated,
            custom,
            output,
            by_label,
        } => merge::run(&config, generated, custom, output, by_label),
        Commands::Regenerate {
            perm_id,
            output,
            store,
            token_file,
        } => regenerate::run(&config, perm_id, output, store, token_file),
    }
}

/// Open the LIMS store named by flags or config
fn open_lims(
    config: &Config,
    store: Option<PathBuf>,
    token_file: Option<PathBuf>,
) -> Result<ontocell::lims::LocalLims> {
    use anyhow::Context;
    use ontocell::lims::{read_token, LocalLims};

    let store = store
        .or_else(|| config.lims.store.clone())
        .context("No LIMS store given (use --store or [lims] store)")?;
    let token_file = token_file
        .or_else(|| config.lims.token_file.clone())
        .context("No token file given (use --token-file or [lims] token_file)")?;

    let token = read_token(&token_file)
        .with_context(|| format!("Failed to read token from {}", token_file.display()))?;
    LocalLims::open(&store, &token)
        .with_context(|| format!("Failed to open LIMS store {}", store.display()))
}
