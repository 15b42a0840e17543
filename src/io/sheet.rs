use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{Result, ToolError};

/// Returns `true` when the path names an Excel workbook rather than a
/// delimited text file.
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "xlsx" | "xlsm"))
        .unwrap_or(false)
}

/// Reads every row of the first worksheet as strings. Empty cells become
/// empty strings so rows keep their positional layout.
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ToolError::MalformedGrid(format!("{} has no worksheets", path.display())))?;

    let range = workbook
        .worksheet_range(&name)
        .ok_or_else(|| ToolError::MalformedGrid(format!("missing sheet '{name}'")))?
        .map_err(ToolError::from)?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect())
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_detection_uses_extension() {
        assert!(is_workbook(Path::new("layout.xlsx")));
        assert!(is_workbook(Path::new("layout.XLSX")));
        assert!(!is_workbook(Path::new("layout.csv")));
        assert!(!is_workbook(Path::new("layout")));
    }

    #[test]
    fn float_cells_render_without_trailing_zero() {
        assert_eq!(cell_to_string(Some(&DataType::Float(1.0))), "1");
        assert_eq!(cell_to_string(Some(&DataType::Float(2.5))), "2.5");
        assert_eq!(cell_to_string(Some(&DataType::Empty)), "");
    }
}
