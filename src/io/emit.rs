use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::model::Table;

/// Writes a table as a comma-separated file with a single header row.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), table = %table.name, rows = table.len(), "table written");
    Ok(())
}

/// Writes each table to `<dir>/<prefix><index>.csv` and returns the paths in
/// input order.
pub fn emit_tables(dir: &Path, tables: &[Table], prefix: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(tables.len());
    for (idx, table) in tables.iter().enumerate() {
        let path = dir.join(format!("{prefix}{idx}.csv"));
        write_table(&path, table)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Reads a file produced by [`write_table`] back into a table named after
/// the file stem.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(File::open(path)?);

    let columns = reader.headers()?.iter().map(str::to_string).collect();
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut table = Table::new(name, columns);
    for record in reader.records() {
        table.push_row(record?.iter().map(str::to_string).collect());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LABEL_COLUMN, RelType, id_column};
    use tempfile::tempdir;

    fn plasmids() -> Table {
        let mut table = Table::new("plasmid", vec![id_column("plasmid_id"), LABEL_COLUMN.into()]);
        for id in ["pUC19", "pET28a,his"] {
            table.push_row(vec![id.into(), "Plasmid".into()]);
        }
        table
    }

    #[test]
    fn emitted_files_are_numbered_in_order() {
        let dir = tempdir().expect("temporary directory");
        let mut rels = Table::relationships("rels");
        rels.push_edge("170101-ms-1", "A1", RelType::Contains);

        let paths = emit_tables(dir.path(), &[plasmids(), rels], "node").unwrap();

        assert_eq!(
            paths,
            vec![dir.path().join("node0.csv"), dir.path().join("node1.csv")]
        );
        assert!(paths.iter().all(|path| path.exists()));
    }

    #[test]
    fn written_table_reads_back_with_same_ids() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("plasmids.csv");
        let table = plasmids();

        write_table(&path, &table).unwrap();
        let restored = read_table(&path).unwrap();

        assert_eq!(restored.columns, table.columns);
        assert_eq!(restored.ids(), table.ids());
        assert_eq!(restored.len(), table.len());
    }

    #[test]
    fn header_has_no_row_number_column() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("plasmids.csv");
        write_table(&path, &plasmids()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("plasmid_id:ID,:LABEL"));
    }
}
