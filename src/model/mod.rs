use std::collections::HashSet;
use std::fmt;

/// Header suffix marking the identifier column of a node file.
pub const ID_SUFFIX: &str = ":ID";
/// Header naming the entity type of every row in a node file.
pub const LABEL_COLUMN: &str = ":LABEL";
/// Relationship file header holding the source identifier.
pub const START_ID_COLUMN: &str = ":START_ID";
/// Relationship file header holding the target identifier.
pub const END_ID_COLUMN: &str = ":END_ID";
/// Relationship file header holding the relationship type.
pub const TYPE_COLUMN: &str = ":TYPE";

/// Entity types emitted as node files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Experiment,
    Person,
    Plate,
    Chemical,
    Replicate,
    Host,
    Plasmid,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Experiment => "Experiment",
            Label::Person => "Person",
            Label::Plate => "Plate",
            Label::Chemical => "Chemical",
            Label::Replicate => "Replicate",
            Label::Host => "Host",
            Label::Plasmid => "Plasmid",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types emitted as relationship files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelType {
    /// Plate → Experiment.
    PartOf,
    /// Plate → Person.
    CreatedBy,
    /// Plate → Chemical.
    HasTarget,
    /// Plate → Replicate.
    Contains,
    /// Host or Plasmid → Replicate.
    FoundIn,
}

impl RelType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelType::PartOf => "PART_OF",
            RelType::CreatedBy => "CREATED_BY",
            RelType::HasTarget => "HAS_TARGET",
            RelType::Contains => "CONTAINS",
            RelType::FoundIn => "FOUND_IN",
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the identifier header for a key, e.g. `plate_id` → `plate_id:ID`.
pub fn id_column(key: &str) -> String {
    format!("{key}{ID_SUFFIX}")
}

/// A table that will be materialised as a delimited file.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates an empty relationship table with the start/end/type headers.
    pub fn relationships(name: impl Into<String>) -> Self {
        Self::new(
            name,
            vec![
                START_ID_COLUMN.to_string(),
                END_ID_COLUMN.to_string(),
                TYPE_COLUMN.to_string(),
            ],
        )
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Appends an edge to a table created with [`Table::relationships`].
    pub fn push_edge(&mut self, start: &str, end: &str, rel: RelType) {
        self.push_row(vec![start.to_string(), end.to_string(), rel.to_string()]);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|header| header == column)
    }

    /// Position of the `<key>:ID` column, if the table is a node table.
    pub fn id_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|header| header.ends_with(ID_SUFFIX) && header.len() > ID_SUFFIX.len())
    }

    /// Values of the named column in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Values of the identifier column in row order.
    pub fn ids(&self) -> Vec<&str> {
        match self.id_index() {
            Some(idx) => self.rows.iter().map(|row| row[idx].as_str()).collect(),
            None => Vec::new(),
        }
    }

    /// Drops rows whose identifier was already seen, keeping the first.
    pub fn dedup_by_id(&mut self) {
        let Some(idx) = self.id_index() else {
            return;
        };
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row[idx].clone()));
    }
}

/// Key/value pairs collected from the metadata sheet. Acts as a single-row
/// table whose headers are the keys in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    entries: Vec<(String, String)>,
}

impl MetadataRecord {
    /// Inserts a pair; a repeated key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the record as a one-row table.
    pub fn to_table(&self) -> Table {
        let columns = self.entries.iter().map(|(key, _)| key.clone()).collect();
        let mut table = Table::new("metadata", columns);
        table.push_row(self.entries.iter().map(|(_, value)| value.clone()).collect());
        table
    }
}

/// Plate layout indexed by row label (e.g. `A`–`H`) and column label
/// (e.g. `1`–`12`). Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGrid {
    pub index_name: String,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// Row-major cells, `cells[row][column]`.
    pub cells: Vec<Vec<Option<String>>>,
}

impl PlateGrid {
    /// Walks the grid column by column, top to bottom, yielding
    /// `(row label, column label, cell)`.
    pub fn wells(&self) -> impl Iterator<Item = (&str, &str, Option<&str>)> + '_ {
        self.column_labels
            .iter()
            .enumerate()
            .flat_map(move |(col_idx, column)| {
                self.row_labels.iter().enumerate().map(move |(row_idx, row)| {
                    let cell = self
                        .cells
                        .get(row_idx)
                        .and_then(|cells| cells.get(col_idx))
                        .and_then(|cell| cell.as_deref());
                    (row.as_str(), column.as_str(), cell)
                })
            })
    }

    /// Renders the grid with the index column first.
    pub fn to_table(&self) -> Table {
        let mut columns = Vec::with_capacity(self.column_labels.len() + 1);
        columns.push(self.index_name.clone());
        columns.extend(self.column_labels.iter().cloned());

        let mut table = Table::new("strain", columns);
        for (label, cells) in self.row_labels.iter().zip(&self.cells) {
            let mut row = Vec::with_capacity(cells.len() + 1);
            row.push(label.clone());
            row.extend(cells.iter().map(|cell| cell.clone().unwrap_or_default()));
            table.push_row(row);
        }
        table
    }
}
