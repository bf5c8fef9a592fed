//! Error types for ledger operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A ledger lock was not acquired within the configured timeout.
    #[error("ledger lock not acquired within {waited:?}")]
    LockTimeout {
        /// How long the caller waited.
        waited: Duration,
    },
    /// Journal backend error.
    #[error("journal error: {0}")]
    Journal(#[from] qrmark_journal::JournalError),
    /// Listing page numbers start at 1 and page sizes must be positive.
    #[error("invalid page {page} (page size {page_size})")]
    InvalidPage {
        /// Requested page.
        page: u32,
        /// Requested page size.
        page_size: usize,
    },
}

impl LedgerError {
    /// Whether the failure is a storage problem the caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::LockTimeout { .. } | LedgerError::Journal(_))
    }
}
