//! Ledger traits.

use crate::error::LedgerError;
use crate::filter::RecordFilter;
use qrmark_canonical::{Points, UserId};
use qrmark_core::{RedemptionOutcome, RedemptionRecord, RedemptionRequest};

/// Write side: the only way a [`RedemptionRecord`] comes into existence.
pub trait RedemptionLedger: Send + Sync {
    /// Commits `request` unless a record for its key already exists.
    ///
    /// Concurrent calls for the same key yield exactly one
    /// [`RedemptionOutcome::Committed`]; the others observe
    /// [`RedemptionOutcome::AlreadyRedeemed`].
    fn redeem(&self, request: &RedemptionRequest) -> Result<RedemptionOutcome, LedgerError>;
}

/// Read side over committed records.
pub trait LedgerReader: Send + Sync {
    /// Sum of points committed to `user`; zero when the user has no records.
    fn user_total(&self, user: UserId) -> Result<Points, LedgerError>;

    /// Sum of points committed to any of `users`, read under one snapshot.
    fn users_total(&self, users: &[UserId]) -> Result<Points, LedgerError> {
        let mut total = Points::ZERO;
        for user in users {
            total = total.saturating_add(self.user_total(*user)?);
        }
        Ok(total)
    }

    /// Matching records in commit order.
    fn scan(&self, filter: &dyn RecordFilter) -> Result<Vec<RedemptionRecord>, LedgerError>;

    /// Number of committed records.
    fn len(&self) -> Result<usize, LedgerError>;

    /// Whether no record has been committed.
    fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}
