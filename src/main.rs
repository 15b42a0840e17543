use std::path::PathBuf;

use clap::Parser;
use synbiochem_db::config::{Config, ImporterChoice};
use synbiochem_db::convert;
use synbiochem_db::import::DEFAULT_IMPORTER;
use synbiochem_db::io::strain::GridShape;
use synbiochem_db::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config();
    let request = convert::run(&config)?;
    println!(
        "{} node files and {} relationship files written to {}",
        request.node_files.len(),
        request.relationship_files.len(),
        config.output_dir.display()
    );
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert plate metadata and strain layout sheets into a graph database bulk import."
)]
struct Cli {
    /// Metadata sheet (comma-separated text or .xlsx).
    metadata: PathBuf,

    /// Strain plate layout (CSV or .xlsx).
    strain: PathBuf,

    /// Target database location handed to the importer.
    database: PathBuf,

    /// Directory receiving snapshots, node and relationship files.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Bulk import program to run.
    #[arg(long, default_value = DEFAULT_IMPORTER)]
    importer: PathBuf,

    /// Write all files but skip the bulk import.
    #[arg(long)]
    dry_run: bool,

    /// Fail on replicate identifiers that are not host_plasmid_replicate.
    #[arg(long)]
    strict: bool,

    /// Leading strain sheet columns to read, row-label column included.
    #[arg(long, default_value_t = GridShape::default().columns)]
    grid_columns: usize,

    /// Strain sheet data rows to read.
    #[arg(long, default_value_t = GridShape::default().rows)]
    grid_rows: usize,

    /// Header of the strain sheet's row-label column.
    #[arg(long, default_value_t = GridShape::default().index_column)]
    index_column: String,
}

impl Cli {
    fn into_config(self) -> Config {
        let importer = if self.dry_run {
            ImporterChoice::DryRun
        } else {
            ImporterChoice::Command(self.importer)
        };

        Config {
            metadata: self.metadata,
            strain: self.strain,
            database: self.database,
            output_dir: self.output_dir,
            grid: GridShape {
                columns: self.grid_columns,
                rows: self.grid_rows,
                index_column: self.index_column,
            },
            strict: self.strict,
            importer,
        }
    }
}
