//! Order ingestion: CSV order rows → purchase events.
//!
//! Every row yields a [`RecordOutcome`]. A row whose item payload cannot be
//! read is skipped with a [`SkipReason`] and ingestion moves on; only a missing
//! file or a header without the required columns stops it.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::types::PurchaseEvent;
use crate::{Error, Result};

pub const USER_COLUMN: &str = "userId";
pub const ITEMS_COLUMN: &str = "items";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingUser,
    MissingItems,
    InvalidJson(String),
    NotAList,
    MissingName { index: usize },
    UnreadableRow(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingUser => write!(f, "missing user id"),
            SkipReason::MissingItems => write!(f, "missing items payload"),
            SkipReason::InvalidJson(e) => write!(f, "items payload is not valid JSON: {}", e),
            SkipReason::NotAList => write!(f, "items payload is not a list"),
            SkipReason::MissingName { index } => write!(f, "line item {} has no name", index),
            SkipReason::UnreadableRow(e) => write!(f, "row could not be read: {}", e),
        }
    }
}

/// A row that contributed nothing. `row` is 1-based and excludes the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Parsed(Vec<PurchaseEvent>),
    Skipped(SkippedRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub events: Vec<PurchaseEvent>,
    pub skipped: Vec<SkippedRecord>,
    pub records_seen: usize,
}

impl IngestReport {
    pub fn from_outcomes<I: IntoIterator<Item = RecordOutcome>>(outcomes: I) -> Self {
        let mut report = Self::default();
        for outcome in outcomes { report.push(outcome); }
        report
    }

    pub fn push(&mut self, outcome: RecordOutcome) {
        self.records_seen += 1;
        match outcome {
            RecordOutcome::Parsed(events) => self.events.extend(events),
            RecordOutcome::Skipped(skipped) => {
                warn!(row = skipped.row, reason = %skipped.reason, "skipping order record");
                self.skipped.push(skipped);
            }
        }
    }

    pub fn skip_count(&self) -> usize { self.skipped.len() }

    /// True when no purchase event survived ingestion.
    pub fn is_empty(&self) -> bool { self.events.is_empty() }
}

/// Parses one order's items payload into events for `user`.
///
/// Exports sometimes double-escape the embedded JSON; when the raw field does
/// not parse, `""` is collapsed to `"` and parsing is retried. The record is
/// all-or-nothing: one unnamed line item rejects it.
pub fn parse_order(user: &str, items_field: &str) -> std::result::Result<Vec<PurchaseEvent>, SkipReason> {
    let user = user.trim();
    if user.is_empty() { return Err(SkipReason::MissingUser); }
    if items_field.trim().is_empty() { return Err(SkipReason::MissingItems); }

    let value: Value = serde_json::from_str(items_field)
        .or_else(|_| serde_json::from_str(&items_field.replace("\"\"", "\"")))
        .map_err(|e| SkipReason::InvalidJson(e.to_string()))?;
    let Value::Array(entries) = value else { return Err(SkipReason::NotAList) };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| PurchaseEvent::new(user, name))
                .ok_or(SkipReason::MissingName { index })
        })
        .collect()
}

pub fn classify_record(row: usize, user: Option<&str>, items: Option<&str>) -> RecordOutcome {
    let parsed = match (user, items) {
        (None, _) => Err(SkipReason::MissingUser),
        (Some(_), None) => Err(SkipReason::MissingItems),
        (Some(user), Some(items)) => parse_order(user, items),
    };
    match parsed {
        Ok(events) => RecordOutcome::Parsed(events),
        Err(reason) => RecordOutcome::Skipped(SkippedRecord { row, reason }),
    }
}

/// Reads order rows from any CSV source. `source` only labels errors.
pub fn ingest_reader<R: Read>(reader: R, source: &Path) -> Result<IngestReport> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h.trim() == name).ok_or_else(|| Error::MissingColumn {
            path: source.to_path_buf(),
            column: name.to_string(),
        })
    };
    let user_idx = column(USER_COLUMN)?;
    let items_idx = column(ITEMS_COLUMN)?;

    let mut report = IngestReport::default();
    for (i, record) in rdr.records().enumerate() {
        let row = i + 1;
        let outcome = match record {
            Ok(record) => classify_record(row, record.get(user_idx), record.get(items_idx)),
            Err(e) => RecordOutcome::Skipped(SkippedRecord { row, reason: SkipReason::UnreadableRow(e.to_string()) }),
        };
        report.push(outcome);
    }
    debug!(source = %source.display(), records = report.records_seen, "finished reading orders");
    info!(
        events = report.events.len(),
        records = report.records_seen,
        skipped = report.skip_count(),
        "ingested orders"
    );
    Ok(report)
}

pub fn ingest_path(path: &Path) -> Result<IngestReport> {
    if !path.is_file() { return Err(Error::MissingInput { path: path.to_path_buf() }); }
    let file = File::open(path)?;
    ingest_reader(file, path)
}
