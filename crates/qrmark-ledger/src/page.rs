use crate::error::LedgerError;
use qrmark_core::RedemptionRecord;
use serde::Serialize;

/// One page of redemption records, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPage {
    /// 1-based page number.
    pub page: u32,
    /// Whether a further page exists.
    pub has_next: bool,
    /// Records on this page.
    pub records: Vec<RedemptionRecord>,
}

/// Slices `records` (in commit order) into the newest-first page `page`.
///
/// Pages start at 1. A page past the end is empty with `has_next == false`.
pub fn paginate(
    records: Vec<RedemptionRecord>,
    page: u32,
    page_size: usize,
) -> Result<RecordPage, LedgerError> {
    if page == 0 || page_size == 0 {
        return Err(LedgerError::InvalidPage { page, page_size });
    }

    let skip = (page as usize - 1).saturating_mul(page_size);
    let total = records.len();
    let records: Vec<_> = records.into_iter().rev().skip(skip).take(page_size).collect();
    let has_next = skip.saturating_add(records.len()) < total;

    Ok(RecordPage {
        page,
        has_next,
        records,
    })
}
