use tracing::{info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::model::{LABEL_COLUMN, Label, PlateGrid, RelType, Table, id_column};

/// Separator between the host, plasmid and replicate fields of a cell.
pub const REPLICATE_SEPARATOR: char = '_';

/// Node and relationship tables cut from the strain grid.
#[derive(Debug, Clone, PartialEq)]
pub struct StrainTables {
    /// Replicate, Host and Plasmid tables, in that order.
    pub nodes: Vec<Table>,
    /// CONTAINS, host FOUND_IN and plasmid FOUND_IN tables, in that order.
    pub relationships: Vec<Table>,
}

/// Host, plasmid and replicate index encoded in a well's cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicateId<'a> {
    pub host: &'a str,
    pub plasmid: &'a str,
    pub replicate: &'a str,
}

impl<'a> ReplicateId<'a> {
    /// Splits `host_plasmid_replicate`; fields past the third are ignored.
    pub fn parse(value: &'a str) -> Option<Self> {
        let mut fields = value.split(REPLICATE_SEPARATOR);
        let host = fields.next().filter(|field| !field.is_empty())?;
        let plasmid = fields.next().filter(|field| !field.is_empty())?;
        let replicate = fields.next()?;
        Some(Self {
            host,
            plasmid,
            replicate,
        })
    }
}

/// Reshapes the grid into replicate, host and plasmid tables.
///
/// Wells whose cell does not split into three fields keep their replicate
/// row and CONTAINS edge; with `strict` set they abort the run instead.
/// Wells without a row or column label have no location and are skipped.
#[instrument(level = "info", skip(grid))]
pub fn parse_strain(grid: &PlateGrid, plate_id: &str, strict: bool) -> Result<StrainTables> {
    let mut replicates = Table::new(
        Label::Replicate.as_str(),
        vec![
            "loc_row".to_string(),
            "loc_col".to_string(),
            "rep_id".to_string(),
            LABEL_COLUMN.to_string(),
            id_column("loc_well"),
        ],
    );
    let mut hosts = Table::new(
        Label::Host.as_str(),
        vec![id_column("host_id"), LABEL_COLUMN.to_string()],
    );
    let mut plasmids = Table::new(
        Label::Plasmid.as_str(),
        vec![id_column("plasmid_id"), LABEL_COLUMN.to_string()],
    );

    let mut contains = Table::relationships("plate replicates");
    let mut host_rels = Table::relationships("host replicates");
    let mut plasmid_rels = Table::relationships("plasmid replicates");

    for (row, column, cell) in grid.wells() {
        let Some(rep_id) = cell else {
            continue;
        };
        if row.is_empty() || column.is_empty() {
            warn!(row, column, rep_id, "well has no row or column label, skipping");
            continue;
        }

        let well = format!("{row}{column}");
        replicates.push_row(vec![
            row.to_string(),
            column.to_string(),
            rep_id.to_string(),
            Label::Replicate.to_string(),
            well.clone(),
        ]);
        contains.push_edge(plate_id, &well, RelType::Contains);

        let Some(parts) = ReplicateId::parse(rep_id) else {
            if strict {
                return Err(ToolError::UnderscoreSplitMismatch {
                    well,
                    value: rep_id.to_string(),
                });
            }
            warn!(%well, rep_id, "replicate does not name host and plasmid, skipping");
            continue;
        };

        hosts.push_row(vec![parts.host.to_string(), Label::Host.to_string()]);
        plasmids.push_row(vec![parts.plasmid.to_string(), Label::Plasmid.to_string()]);
        host_rels.push_edge(parts.host, &well, RelType::FoundIn);
        plasmid_rels.push_edge(parts.plasmid, &well, RelType::FoundIn);
    }

    hosts.dedup_by_id();
    plasmids.dedup_by_id();

    info!(
        replicates = replicates.len(),
        hosts = hosts.len(),
        plasmids = plasmids.len(),
        "parsed strain grid"
    );

    Ok(StrainTables {
        nodes: vec![replicates, hosts, plasmids],
        relationships: vec![contains, host_rels, plasmid_rels],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cells: Vec<Vec<Option<&str>>>) -> PlateGrid {
        let row_labels = ["A", "B", "C", "D", "E", "F", "G", "H"]
            .iter()
            .take(cells.len())
            .map(|label| label.to_string())
            .collect();
        let width = cells.first().map(Vec::len).unwrap_or(0);
        PlateGrid {
            index_name: "PLATE #1".into(),
            row_labels,
            column_labels: (1..=width).map(|col| col.to_string()).collect(),
            cells: cells
                .into_iter()
                .map(|row| row.into_iter().map(|cell| cell.map(str::to_string)).collect())
                .collect(),
        }
    }

    fn edge(start: &str, end: &str, rel: &str) -> Vec<String> {
        vec![start.to_string(), end.to_string(), rel.to_string()]
    }

    #[test]
    fn single_well_yields_host_plasmid_and_edges() {
        let tables = parse_strain(&grid(vec![vec![Some("E3_pUC19_2")]]), "170101-ms-1", false)
            .unwrap();

        let [replicates, hosts, plasmids] = tables.nodes.as_slice() else {
            panic!("expected three node tables");
        };
        assert_eq!(replicates.ids(), vec!["A1"]);
        assert_eq!(replicates.column_values("rep_id"), Some(vec!["E3_pUC19_2"]));
        assert_eq!(hosts.ids(), vec!["E3"]);
        assert_eq!(plasmids.ids(), vec!["pUC19"]);

        assert_eq!(tables.relationships[0].rows, vec![edge("170101-ms-1", "A1", "CONTAINS")]);
        assert_eq!(tables.relationships[1].rows, vec![edge("E3", "A1", "FOUND_IN")]);
        assert_eq!(tables.relationships[2].rows, vec![edge("pUC19", "A1", "FOUND_IN")]);
    }

    #[test]
    fn hosts_and_plasmids_are_deduplicated() {
        let tables = parse_strain(
            &grid(vec![
                vec![Some("E3_pUC19_1"), Some("E3_pET28_1")],
                vec![Some("E3_pUC19_2"), Some("DH5a_pET28_2")],
            ]),
            "p",
            false,
        )
        .unwrap();

        assert_eq!(tables.nodes[1].ids(), vec!["E3", "DH5a"]);
        assert_eq!(tables.nodes[2].ids(), vec!["pUC19", "pET28"]);
        assert_eq!(tables.relationships[1].len(), 4);
        assert_eq!(tables.relationships[2].len(), 4);
    }

    #[test]
    fn contains_edges_match_non_missing_wells() {
        let tables = parse_strain(
            &grid(vec![
                vec![Some("E3_pUC19_1"), None, Some("blank")],
                vec![None, Some("E3_pUC19_2"), None],
            ]),
            "p",
            false,
        )
        .unwrap();

        assert_eq!(tables.relationships[0].len(), 3);
        assert_eq!(tables.nodes[0].ids(), vec!["A1", "B2", "A3"]);
        assert_eq!(tables.relationships[1].len(), 2);
    }

    #[test]
    fn extra_fields_are_dropped() {
        let parts = ReplicateId::parse("E3_pUC19_2_extra").unwrap();
        assert_eq!(
            parts,
            ReplicateId {
                host: "E3",
                plasmid: "pUC19",
                replicate: "2"
            }
        );
        assert_eq!(ReplicateId::parse("E3_pUC19"), None);
        assert_eq!(ReplicateId::parse("blank"), None);
    }

    #[test]
    fn unlabelled_rows_are_skipped() {
        let mut grid = grid(vec![vec![Some("E3_pUC19_1")], vec![Some("E3_pUC19_2")]]);
        grid.row_labels[1] = String::new();

        let tables = parse_strain(&grid, "p", false).unwrap();

        assert_eq!(tables.nodes[0].ids(), vec!["A1"]);
        assert_eq!(tables.relationships[0].rows, vec![edge("p", "A1", "CONTAINS")]);
        assert_eq!(tables.relationships[1].len(), 1);
    }

    #[test]
    fn strict_mode_rejects_incomplete_identifiers() {
        let err = parse_strain(&grid(vec![vec![Some("E3-pUC19")]]), "p", true).unwrap_err();
        assert!(matches!(
            err,
            ToolError::UnderscoreSplitMismatch { well, value } if well == "A1" && value == "E3-pUC19"
        ));
    }
}
