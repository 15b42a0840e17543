use std::fs;

use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::import::{BulkImporter, ImportRequest, MANIFEST_FILE};
use crate::io::emit::emit_tables;
use crate::io::metadata::import_metadata;
use crate::io::strain::import_strain;
use crate::parse::metadata::parse_metadata;
use crate::parse::strain::parse_strain;

/// Prefix of the emitted node files.
pub const NODE_PREFIX: &str = "node";
/// Prefix of the emitted relationship files.
pub const RELS_PREFIX: &str = "rels";

/// Runs the whole conversion with the importer named in `config`.
pub fn run(config: &Config) -> Result<ImportRequest> {
    let importer = config.importer.build();
    run_with(config, importer.as_ref())
}

/// Reads both sheets, emits node and relationship files into the output
/// directory and hands them to `importer`.
#[instrument(
    level = "info",
    skip_all,
    fields(
        metadata = %config.metadata.display(),
        strain = %config.strain.display(),
        database = %config.database.display()
    )
)]
pub fn run_with(config: &Config, importer: &dyn BulkImporter) -> Result<ImportRequest> {
    fs::create_dir_all(&config.output_dir)?;

    let record = import_metadata(&config.metadata, &config.output_dir)?;
    let metadata = parse_metadata(&record)?;

    let grid = import_strain(&config.strain, &config.grid, &config.output_dir)?;
    let strain = parse_strain(&grid, &metadata.plate_id, config.strict)?;

    let mut nodes = metadata.nodes;
    nodes.extend(strain.nodes);
    let mut relationships = metadata.relationships;
    relationships.extend(strain.relationships);

    let node_files = emit_tables(&config.output_dir, &nodes, NODE_PREFIX)?;
    let relationship_files = emit_tables(&config.output_dir, &relationships, RELS_PREFIX)?;
    info!(
        nodes = node_files.len(),
        relationships = relationship_files.len(),
        "tables emitted"
    );

    let request = ImportRequest {
        database: config.database.clone(),
        node_files,
        relationship_files,
    };
    let manifest = config.output_dir.join(MANIFEST_FILE);
    request.write_manifest(&manifest)?;
    debug!(manifest = %manifest.display(), "import manifest written");

    importer.import(&request)?;
    Ok(request)
}
