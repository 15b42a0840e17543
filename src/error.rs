use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while the
/// tool reads the laboratory sheets, reshapes them, or hands them to the
/// bulk importer.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a CSV file cannot be parsed or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the import manifest cannot be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a column required by an extraction rule is absent.
    #[error("missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    /// Raised when the plate grid does not have the configured shape.
    #[error("malformed plate grid: {0}")]
    MalformedGrid(String),

    /// Raised in strict mode when a replicate identifier lacks host, plasmid
    /// and replicate fields.
    #[error("replicate '{value}' at well {well} does not split into host_plasmid_replicate")]
    UnderscoreSplitMismatch { well: String, value: String },

    /// Raised when the external importer exits unsuccessfully.
    #[error("bulk import with '{program}' failed: {status}")]
    ImportFailed { program: String, status: ExitStatus },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    pub(crate) fn missing_column(table: &str, column: &str) -> Self {
        ToolError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
