//! Offline consistency audit of a redemption journal.

use crate::errors::JournalError;
use crate::reader::{JournalReader, ReadMode};
use qrmark_canonical::Points;
use qrmark_core::RedemptionKey;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Summary of a journal scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalAudit {
    /// Number of redemption records read.
    pub records: u64,
    /// Keys that appear more than once, in order of first repetition.
    pub duplicates: Vec<RedemptionKey>,
    /// Sum of points over first occurrences only.
    pub total_points: Points,
    /// Offset just past the last complete frame.
    pub end_offset: u64,
}

impl JournalAudit {
    /// Whether the journal upholds the one-record-per-key invariant.
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
    }
}

/// Scans a journal and checks the one-record-per-key invariant.
pub fn audit_journal<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<JournalAudit, JournalError> {
    let mut reader = JournalReader::open(path, mode)?;
    let mut seen = HashSet::new();
    let mut audit = JournalAudit {
        records: 0,
        duplicates: Vec::new(),
        total_points: Points::ZERO,
        end_offset: reader.position(),
    };

    while let Some(record) = reader.read_record()? {
        audit.records += 1;
        if seen.insert(record.key()) {
            audit.total_points = audit.total_points.saturating_add(record.points);
        } else {
            audit.duplicates.push(record.key());
        }
    }
    audit.end_offset = reader.position();

    Ok(audit)
}
