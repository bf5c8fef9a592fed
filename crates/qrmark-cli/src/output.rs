//! Output formatting utilities.

use qrmark_core::RedemptionRecord;
use serde::Serialize;

/// Formats any serializable value as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Formats a record as a simple table row.
pub fn format_table_row(record: &RedemptionRecord) -> String {
    format!(
        "{:<24} {:<12} {:<12} {:<12} {:>8}",
        record.committed_at.to_string(),
        record.qrmark_id.to_string(),
        record.user_id.to_string(),
        record.group_id.to_string(),
        record.points.to_string()
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<24} {:<12} {:<12} {:<12} {:>8}",
        "COMMITTED_AT", "QRMARK", "USER", "GROUP", "POINTS"
    );
    println!("{}", "-".repeat(72));
}

/// One-line summary of a redemption outcome.
pub fn format_outcome(label: &str, record: &RedemptionRecord) -> String {
    format!(
        "{} qrmark={} user={} group={} points={}",
        label, record.qrmark_id, record.user_id, record.group_id, record.points
    )
}
