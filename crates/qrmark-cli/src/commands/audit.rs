//! Audit command implementation.

use crate::error::CliError;
use crate::output;
use qrmark_journal::{audit_journal, ReadMode};
use std::path::PathBuf;

pub fn run(journal: PathBuf, permissive: bool, json: bool) -> Result<(), CliError> {
    let mode = if permissive {
        ReadMode::Permissive
    } else {
        ReadMode::Strict
    };
    let audit = audit_journal(&journal, mode)?;

    if json {
        println!("{}", output::format_json(&audit)?);
    } else {
        println!("records:      {}", audit.records);
        println!("total points: {}", audit.total_points);
        println!("end offset:   {}", audit.end_offset);
        for key in &audit.duplicates {
            println!("DUPLICATE qrmark={} user={}", key.qrmark_id, key.user_id);
        }
    }

    if audit.is_clean() {
        Ok(())
    } else {
        Err(CliError::AuditFailed(audit.duplicates.len()))
    }
}
