use std::fs::File;
use std::path::Path;

use tracing::{info, instrument};

use crate::error::{Result, ToolError};
use crate::io::{emit, sheet};
use crate::model::PlateGrid;

/// File name of the strain grid snapshot written next to the emitted tables.
pub const STRAIN_SNAPSHOT: &str = "strain.csv";

/// Expected layout of the strain sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridShape {
    /// Leading columns read from the sheet, index column included.
    pub columns: usize,
    /// Data rows read below the header.
    pub rows: usize,
    /// Header of the column holding the row labels.
    pub index_column: String,
}

impl Default for GridShape {
    /// An 8 × 12 microplate with its row-label column.
    fn default() -> Self {
        Self {
            columns: 13,
            rows: 8,
            index_column: "PLATE #1".to_string(),
        }
    }
}

/// Reads the strain sheet (CSV or Excel) into a plate grid of the given shape.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_strain(path: &Path, shape: &GridShape) -> Result<PlateGrid> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    let records = if sheet::is_workbook(path) {
        sheet::read_first_sheet(path)?
    } else {
        read_csv_records(path, shape.rows + 1)?
    };

    grid_from_records(records, shape)
}

/// Reads the strain sheet and writes the grid snapshot into `output_dir`.
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.display(), output = %output_dir.display())
)]
pub fn import_strain(path: &Path, shape: &GridShape, output_dir: &Path) -> Result<PlateGrid> {
    let grid = read_strain(path, shape)?;
    info!(
        rows = grid.row_labels.len(),
        columns = grid.column_labels.len(),
        "read plate grid"
    );
    emit::write_table(&output_dir.join(STRAIN_SNAPSHOT), &grid.to_table())?;
    Ok(grid)
}

fn read_csv_records(path: &Path, limit: usize) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(File::open(path)?);

    let mut records = Vec::with_capacity(limit);
    for record in reader.records().take(limit) {
        records.push(record?.iter().map(str::to_string).collect());
    }
    Ok(records)
}

/// Cuts a header row plus data rows down to the configured grid and lifts
/// the index column out as row labels.
pub fn grid_from_records(records: Vec<Vec<String>>, shape: &GridShape) -> Result<PlateGrid> {
    let mut rows = records.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| ToolError::MalformedGrid("strain sheet is empty".into()))?;

    if header.len() < shape.columns {
        return Err(ToolError::MalformedGrid(format!(
            "expected at least {} columns, found {}",
            shape.columns,
            header.len()
        )));
    }

    let header: Vec<String> = header
        .into_iter()
        .take(shape.columns)
        .map(|name| name.trim().to_string())
        .collect();
    let index = header
        .iter()
        .position(|name| *name == shape.index_column)
        .ok_or_else(|| {
            ToolError::MalformedGrid(format!(
                "index column '{}' not found in the first {} columns",
                shape.index_column, shape.columns
            ))
        })?;

    let data: Vec<Vec<String>> = rows.take(shape.rows).collect();
    if data.len() < shape.rows {
        return Err(ToolError::MalformedGrid(format!(
            "expected at least {} rows, found {}",
            shape.rows,
            data.len()
        )));
    }

    let column_labels = header
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != index)
        .map(|(_, name)| name.clone())
        .collect();

    let mut row_labels = Vec::with_capacity(data.len());
    let mut cells = Vec::with_capacity(data.len());
    for record in data {
        let mut row_cells = Vec::with_capacity(shape.columns - 1);
        for idx in 0..shape.columns {
            let value = record
                .get(idx)
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string);
            if idx == index {
                row_labels.push(value.unwrap_or_default());
            } else {
                row_cells.push(value);
            }
        }
        cells.push(row_cells);
    }

    Ok(PlateGrid {
        index_name: shape.index_column.clone(),
        row_labels,
        column_labels,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_shape() -> GridShape {
        GridShape {
            columns: 3,
            rows: 2,
            index_column: "PLATE #1".into(),
        }
    }

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn extra_rows_and_columns_are_cut() {
        let grid = grid_from_records(
            records(&[
                &["PLATE #1", "1", "2", "notes"],
                &["A", "E3_pUC19_1", "", "ignored"],
                &["B", "", "E3_pUC19_2", ""],
                &["Totals", "x", "y", ""],
            ]),
            &small_shape(),
        )
        .unwrap();

        assert_eq!(grid.row_labels, vec!["A", "B"]);
        assert_eq!(grid.column_labels, vec!["1", "2"]);
        assert_eq!(
            grid.cells,
            vec![
                vec![Some("E3_pUC19_1".to_string()), None],
                vec![None, Some("E3_pUC19_2".to_string())],
            ]
        );
    }

    #[test]
    fn short_rows_yield_missing_cells() {
        let grid = grid_from_records(
            records(&[&["PLATE #1", "1", "2"], &["A", "E3_p_1"], &["B"]]),
            &small_shape(),
        )
        .unwrap();

        assert_eq!(grid.cells[0], vec![Some("E3_p_1".to_string()), None]);
        assert_eq!(grid.cells[1], vec![None, None]);
    }

    #[test]
    fn padded_headers_and_blank_cells_are_trimmed() {
        let grid = grid_from_records(
            records(&[
                &["PLATE #1 ", " 1", "2"],
                &["A", " E3_pUC19_1 ", "   "],
                &["B", "", "E3_pUC19_2"],
            ]),
            &small_shape(),
        )
        .unwrap();

        assert_eq!(grid.column_labels, vec!["1", "2"]);
        assert_eq!(grid.cells[0], vec![Some("E3_pUC19_1".to_string()), None]);
    }

    #[test]
    fn too_few_columns_is_malformed() {
        let err = grid_from_records(
            records(&[&["PLATE #1", "1"], &["A", "x"], &["B", "y"]]),
            &small_shape(),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::MalformedGrid(_)));
    }

    #[test]
    fn too_few_rows_is_malformed() {
        let err = grid_from_records(
            records(&[&["PLATE #1", "1", "2"], &["A", "x", "y"]]),
            &small_shape(),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::MalformedGrid(message) if message.contains("rows")));
    }

    #[test]
    fn missing_index_column_is_malformed() {
        let err = grid_from_records(
            records(&[&["Row", "1", "2"], &["A", "x", "y"], &["B", "x", "y"]]),
            &small_shape(),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::MalformedGrid(message) if message.contains("PLATE #1")));
    }

    #[test]
    fn default_shape_is_a_96_well_plate() {
        let shape = GridShape::default();
        assert_eq!(shape.rows * (shape.columns - 1), 96);
    }
}
