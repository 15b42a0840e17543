//! Reshapes the metadata record into Experiment, Person, Plate and Chemical
//! node tables and the edges linking the plate to them.
//!
//! Extraction is declared as data: each [`EntityRule`] lists the source keys
//! it reads and the header each one becomes. Values are copied unchanged;
//! a value under an `:int` or `:float` header that does not parse is only
//! reported, the importer decides what to do with it.

use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::model::{LABEL_COLUMN, Label, MetadataRecord, RelType, Table};

pub const EXPERIMENT_KEY: &str = "Experiment Name/Revision";
pub const EXPERIMENTALIST_KEY: &str = "Experimentalist";
pub const PLATE_ID_KEY: &str = "Plate ID (yymmdd-inst-exp)";
/// Every metadata key containing this text names a target chemical.
pub const TARGET_PATTERN: &str = "Target";

/// Maps one metadata key onto one output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    pub source: &'static str,
    pub header: &'static str,
}

impl ColumnRule {
    pub const fn new(source: &'static str, header: &'static str) -> Self {
        Self { source, header }
    }
}

/// Declares how a single-row node table is cut from the metadata record.
#[derive(Debug, Clone, Copy)]
pub struct EntityRule {
    pub label: Label,
    pub columns: &'static [ColumnRule],
}

pub const EXPERIMENT_RULE: EntityRule = EntityRule {
    label: Label::Experiment,
    columns: &[ColumnRule::new(EXPERIMENT_KEY, "exp_id:ID")],
};

pub const PERSON_RULE: EntityRule = EntityRule {
    label: Label::Person,
    columns: &[ColumnRule::new(EXPERIMENTALIST_KEY, "name:ID")],
};

pub const PLATE_RULE: EntityRule = EntityRule {
    label: Label::Plate,
    columns: &[
        ColumnRule::new("Analysis Plate Dilution Factor", "dilution_factor"),
        ColumnRule::new("Date Created (yymmdd)", "date_created"),
        ColumnRule::new("Induction time", "induction_time"),
        ColumnRule::new("Lab Archives URL", "lab_archives_url"),
        ColumnRule::new("Number of Well Plates", "num_well_plates:int"),
        ColumnRule::new(PLATE_ID_KEY, "plate_id:ID"),
        ColumnRule::new("Technology Type (e.g. GCMS)", "instrument"),
        ColumnRule::new("Temperature", "temperature:float"),
    ],
};

pub const CHEMICAL_ID_HEADER: &str = "chebi_id:ID";

/// Node and relationship tables cut from the metadata sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTables {
    /// Experiment, Person, Plate and Chemical tables, in that order.
    pub nodes: Vec<Table>,
    pub relationships: Vec<Table>,
    /// Identifier of the plate, the start of every CONTAINS edge.
    pub plate_id: String,
}

#[instrument(level = "info", skip_all)]
pub fn parse_metadata(record: &MetadataRecord) -> Result<MetadataTables> {
    let experiment = extract_entity(record, &EXPERIMENT_RULE)?;
    let person = extract_entity(record, &PERSON_RULE)?;
    let plate = extract_entity(record, &PLATE_RULE)?;
    let targets = target_values(record);
    let chemical = chemical_table(&targets);

    let plate_id = required(record, PLATE_ID_KEY, Label::Plate)?;
    let experiment_id = required(record, EXPERIMENT_KEY, Label::Experiment)?;
    let person_id = required(record, EXPERIMENTALIST_KEY, Label::Person)?;

    let mut rels = Table::relationships("metadata relationships");
    rels.push_edge(plate_id, experiment_id, RelType::PartOf);
    rels.push_edge(plate_id, person_id, RelType::CreatedBy);
    for chebi_id in &targets {
        rels.push_edge(plate_id, chebi_id, RelType::HasTarget);
    }

    info!(
        plate_id,
        chemicals = chemical.len(),
        relationships = rels.len(),
        "parsed metadata"
    );

    Ok(MetadataTables {
        nodes: vec![experiment, person, plate, chemical],
        relationships: vec![rels],
        plate_id: plate_id.to_string(),
    })
}

/// Builds a one-row node table following `rule`, with the `:LABEL` column
/// appended.
pub fn extract_entity(record: &MetadataRecord, rule: &EntityRule) -> Result<Table> {
    let mut columns: Vec<String> = rule.columns.iter().map(|c| c.header.to_string()).collect();
    columns.push(LABEL_COLUMN.to_string());

    let mut row = Vec::with_capacity(columns.len());
    for column in rule.columns {
        let value = required(record, column.source, rule.label)?;
        warn_if_untyped(column.header, value);
        row.push(value.to_string());
    }
    row.push(rule.label.to_string());

    let mut table = Table::new(rule.label.as_str(), columns);
    table.push_row(row);
    Ok(table)
}

/// Values of every key containing [`TARGET_PATTERN`], in key order.
pub fn target_values(record: &MetadataRecord) -> Vec<String> {
    record
        .iter()
        .filter(|(key, _)| key.contains(TARGET_PATTERN))
        .map(|(_, value)| value.to_string())
        .collect()
}

fn chemical_table(targets: &[String]) -> Table {
    let mut table = Table::new(
        Label::Chemical.as_str(),
        vec![CHEMICAL_ID_HEADER.to_string(), LABEL_COLUMN.to_string()],
    );
    for chebi_id in targets {
        table.push_row(vec![chebi_id.clone(), Label::Chemical.to_string()]);
    }
    let before = table.len();
    table.dedup_by_id();
    if table.len() != before {
        debug!(duplicates = before - table.len(), "collapsed repeated target chemicals");
    }
    table
}

fn required<'a>(record: &'a MetadataRecord, key: &str, label: Label) -> Result<&'a str> {
    record
        .get(key)
        .ok_or_else(|| ToolError::missing_column(&format!("{label} metadata"), key))
}

fn warn_if_untyped(header: &str, value: &str) {
    let valid = if header.ends_with(":int") {
        value.trim().parse::<i64>().is_ok()
    } else if header.ends_with(":float") {
        value.trim().parse::<f64>().is_ok()
    } else {
        true
    };

    if !valid {
        warn!(column = header, value, "value does not match the column type");
    }
}
