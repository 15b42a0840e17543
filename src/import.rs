//! Hand-off to the external bulk-import utility.
//!
//! The importer infers labels and relationship types from the `:ID`,
//! `:LABEL`, `:START_ID`, `:END_ID` and `:TYPE` headers of the emitted files;
//! this module only assembles the invocation.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{Result, ToolError};

/// Program invoked when no importer is configured.
pub const DEFAULT_IMPORTER: &str = "neo4j-import";
/// File name of the request manifest written next to the emitted tables.
pub const MANIFEST_FILE: &str = "import.json";

/// Everything the bulk importer needs for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub database: PathBuf,
    pub node_files: Vec<PathBuf>,
    pub relationship_files: Vec<PathBuf>,
}

impl ImportRequest {
    /// Writes the request as pretty-printed JSON.
    pub fn write_manifest(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Loads node and relationship files into the target database.
pub trait BulkImporter {
    fn import(&self, request: &ImportRequest) -> Result<()>;
}

/// Runs an external command line importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandImporter {
    pub program: PathBuf,
}

impl Default for CommandImporter {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_IMPORTER),
        }
    }
}

impl CommandImporter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to the importer:
    /// `--into <db> --nodes <file>... --relationships <file>...`.
    pub fn arguments(&self, request: &ImportRequest) -> Vec<OsString> {
        let mut args = Vec::with_capacity(
            2 + 2 * (request.node_files.len() + request.relationship_files.len()),
        );
        args.push(OsString::from("--into"));
        args.push(request.database.clone().into_os_string());
        for file in &request.node_files {
            args.push(OsString::from("--nodes"));
            args.push(file.clone().into_os_string());
        }
        for file in &request.relationship_files {
            args.push(OsString::from("--relationships"));
            args.push(file.clone().into_os_string());
        }
        args
    }

    pub fn command(&self, request: &ImportRequest) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.arguments(request));
        command
    }
}

impl BulkImporter for CommandImporter {
    #[instrument(
        level = "info",
        skip_all,
        fields(program = %self.program.display(), database = %request.database.display())
    )]
    fn import(&self, request: &ImportRequest) -> Result<()> {
        let status = self.command(request).status()?;
        if !status.success() {
            return Err(ToolError::ImportFailed {
                program: self.program.display().to_string(),
                status,
            });
        }
        info!(
            nodes = request.node_files.len(),
            relationships = request.relationship_files.len(),
            "bulk import finished"
        );
        Ok(())
    }
}

/// Logs the request without touching the database.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunImporter;

impl BulkImporter for DryRunImporter {
    fn import(&self, request: &ImportRequest) -> Result<()> {
        info!(
            database = %request.database.display(),
            nodes = request.node_files.len(),
            relationships = request.relationship_files.len(),
            "dry run, bulk import skipped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request() -> ImportRequest {
        ImportRequest {
            database: PathBuf::from("graph.db"),
            node_files: vec![PathBuf::from("node0.csv"), PathBuf::from("node1.csv")],
            relationship_files: vec![PathBuf::from("rels0.csv")],
        }
    }

    #[test]
    fn arguments_list_every_file_in_order() {
        let args = CommandImporter::default().arguments(&request());
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "--into",
                "graph.db",
                "--nodes",
                "node0.csv",
                "--nodes",
                "node1.csv",
                "--relationships",
                "rels0.csv",
            ]
        );
    }

    #[test]
    fn command_uses_configured_program() {
        let command = CommandImporter::new("/opt/neo4j/bin/neo4j-import").command(&request());
        assert_eq!(command.get_program(), "/opt/neo4j/bin/neo4j-import");
        assert_eq!(command.get_args().count(), 8);
    }

    #[test]
    fn missing_program_surfaces_io_error() {
        let importer = CommandImporter::new("/nonexistent/bin/neo4j-import");
        let err = importer.import(&request()).unwrap_err();
        assert!(matches!(err, ToolError::Io(_)));
    }

    #[test]
    fn manifest_round_trips_through_json() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join(MANIFEST_FILE);
        request().write_manifest(&path).unwrap();

        let restored: ImportRequest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored, request());
    }
}
