use std::path::PathBuf;

use crate::import::{BulkImporter, CommandImporter, DryRunImporter};
use crate::io::strain::GridShape;

/// Which bulk importer receives the emitted files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImporterChoice {
    /// Run the given external program.
    Command(PathBuf),
    /// Emit files and the manifest only.
    DryRun,
}

impl ImporterChoice {
    pub fn build(&self) -> Box<dyn BulkImporter> {
        match self {
            ImporterChoice::Command(program) => Box::new(CommandImporter::new(program.clone())),
            ImporterChoice::DryRun => Box::new(DryRunImporter),
        }
    }
}

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub metadata: PathBuf,
    pub strain: PathBuf,
    pub database: PathBuf,
    /// Directory receiving snapshots, node/relationship files and the manifest.
    pub output_dir: PathBuf,
    pub grid: GridShape,
    /// Fail on replicate identifiers that lack host or plasmid fields.
    pub strict: bool,
    pub importer: ImporterChoice,
}

impl Config {
    /// Configuration with the default grid shape and importer, writing into
    /// the current directory.
    pub fn new(
        metadata: impl Into<PathBuf>,
        strain: impl Into<PathBuf>,
        database: impl Into<PathBuf>,
    ) -> Self {
        Self {
            metadata: metadata.into(),
            strain: strain.into(),
            database: database.into(),
            output_dir: PathBuf::from("."),
            grid: GridShape::default(),
            strict: false,
            importer: ImporterChoice::Command(CommandImporter::default().program),
        }
    }
}
