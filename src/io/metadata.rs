//! Reader for the experiment metadata sheet.
//!
//! The sheet is a loose list of `key,value` lines followed by a free-text
//! options section. The options section starts at the first line with at
//! least two tokens, one of which is exactly [`OPTIONS_MARKER`], and is never
//! read as key/value data.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::{Result, ToolError};
use crate::io::{emit, sheet};
use crate::model::MetadataRecord;

/// Token that opens the options section of the metadata sheet.
pub const OPTIONS_MARKER: &str = "Experimentalists List";
/// File name of the metadata snapshot written next to the emitted tables.
pub const METADATA_SNAPSHOT: &str = "metadata.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Collecting,
    Skipping,
}

/// Two-state scanner turning token lines into a [`MetadataRecord`].
#[derive(Debug)]
pub struct MetadataScanner {
    state: ScanState,
    record: MetadataRecord,
}

impl Default for MetadataScanner {
    fn default() -> Self {
        Self {
            state: ScanState::Collecting,
            record: MetadataRecord::default(),
        }
    }
}

impl MetadataScanner {
    /// Feeds one line worth of tokens. Empty tokens are ignored.
    pub fn feed<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.state == ScanState::Skipping {
            return;
        }

        let tokens: Vec<&str> = tokens.into_iter().filter(|token| !token.is_empty()).collect();
        let [key, value, ..] = tokens.as_slice() else {
            return;
        };

        if tokens.contains(&OPTIONS_MARKER) {
            debug!("options section reached, skipping remaining lines");
            self.state = ScanState::Skipping;
            return;
        }

        self.record.insert(*key, *value);
    }

    /// Feeds a raw comma-separated line.
    pub fn feed_line(&mut self, line: &str) {
        self.feed(line.trim().split(','));
    }

    pub fn is_skipping(&self) -> bool {
        self.state == ScanState::Skipping
    }

    pub fn finish(self) -> MetadataRecord {
        self.record
    }
}

/// Scans comma-separated lines from any buffered reader.
pub fn scan_lines<R: BufRead>(reader: R) -> Result<MetadataRecord> {
    let mut scanner = MetadataScanner::default();
    for line in reader.lines() {
        scanner.feed_line(&line?);
    }
    Ok(scanner.finish())
}

/// Reads the metadata sheet from a text file or an Excel workbook.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_metadata(path: &Path) -> Result<MetadataRecord> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    if sheet::is_workbook(path) {
        let mut scanner = MetadataScanner::default();
        for row in sheet::read_first_sheet(path)? {
            scanner.feed(row.iter().map(String::as_str));
        }
        return Ok(scanner.finish());
    }

    let file = File::open(path)?;
    scan_lines(BufReader::new(file))
}

/// Reads the metadata sheet and writes the collected pairs as a one-row
/// snapshot into `output_dir`.
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.display(), output = %output_dir.display())
)]
pub fn import_metadata(path: &Path, output_dir: &Path) -> Result<MetadataRecord> {
    let record = read_metadata(path)?;
    info!(pairs = record.len(), "collected metadata pairs");
    emit::write_table(&output_dir.join(METADATA_SNAPSHOT), &record.to_table())?;
    Ok(record)
}
