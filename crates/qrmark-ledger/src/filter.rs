//! Record filtering for selective scans.

use qrmark_canonical::{GroupId, QrmarkId, Timestamp, UserId};
use qrmark_core::RedemptionRecord;

/// Trait for filtering records during a scan.
pub trait RecordFilter: Send + Sync {
    /// Returns true if the record matches the filter criteria.
    fn matches(&self, record: &RedemptionRecord) -> bool;
}

/// Matches every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllRecords;

impl RecordFilter for AllRecords {
    fn matches(&self, _record: &RedemptionRecord) -> bool {
        true
    }
}

/// Filter by redeeming user.
#[derive(Debug, Clone, Copy)]
pub struct UserFilter {
    /// User to match.
    pub user_id: UserId,
}

impl RecordFilter for UserFilter {
    fn matches(&self, record: &RedemptionRecord) -> bool {
        record.user_id == self.user_id
    }
}

/// Filter by sponsoring group.
#[derive(Debug, Clone, Copy)]
pub struct GroupFilter {
    /// Group to match.
    pub group_id: GroupId,
}

impl RecordFilter for GroupFilter {
    fn matches(&self, record: &RedemptionRecord) -> bool {
        record.group_id == self.group_id
    }
}

/// Filter by qrmark instance.
#[derive(Debug, Clone, Copy)]
pub struct QrmarkFilter {
    /// Qrmark to match.
    pub qrmark_id: QrmarkId,
}

impl RecordFilter for QrmarkFilter {
    fn matches(&self, record: &RedemptionRecord) -> bool {
        record.qrmark_id == self.qrmark_id
    }
}

/// Filter by commit time.
#[derive(Debug, Clone, Default)]
pub struct CommittedRangeFilter {
    /// Include records committed at or after this timestamp.
    pub after: Option<Timestamp>,
    /// Include records committed at or before this timestamp.
    pub before: Option<Timestamp>,
}

impl RecordFilter for CommittedRangeFilter {
    fn matches(&self, record: &RedemptionRecord) -> bool {
        if let Some(ref after) = self.after {
            if record.committed_at < *after {
                return false;
            }
        }
        if let Some(ref before) = self.before {
            if record.committed_at > *before {
                return false;
            }
        }
        true
    }
}

/// Matches when every inner filter matches.
pub struct AndFilter {
    filters: Vec<Box<dyn RecordFilter>>,
}

impl AndFilter {
    /// Creates a conjunction of `filters`. An empty conjunction matches everything.
    pub fn new(filters: Vec<Box<dyn RecordFilter>>) -> Self {
        Self { filters }
    }
}

impl RecordFilter for AndFilter {
    fn matches(&self, record: &RedemptionRecord) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }
}
