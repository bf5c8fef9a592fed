//! Redemption ledger and read-only point aggregation for qrmark.
//!
//! This crate provides:
//! - [`RedemptionLedger`] and [`LedgerReader`] traits
//! - [`MemoryLedger`]: in-process ledger
//! - [`JournalLedger`]: ledger persisted to a `qrmark-journal` file and
//!   rebuilt from it on open
//! - Record filters and page-based listing
//! - [`AggregationQuery`]: per-user and per-school point totals
//!
//! Core invariants:
//! - At most one record per `(qrmark_id, user_id)`; a repeat is
//!   [`RedemptionOutcome::AlreadyRedeemed`](qrmark_core::RedemptionOutcome)
//! - Check-then-insert for one key is serialized; distinct keys do not
//!   contend on the same lock except by stripe collision
//! - A record and its balance effect become visible together or not at all
//! - Every lock wait is bounded; a timeout is [`LedgerError::LockTimeout`]

#![deny(missing_docs)]

/// Point aggregation and the school directory.
pub mod aggregate;
/// Error types for ledger operations.
pub mod error;
/// Record filters.
pub mod filter;
/// Journal-backed ledger.
pub mod journal;
/// In-memory ledger.
pub mod memory;
/// Ledger tuning options.
pub mod options;
/// Page-based listing.
pub mod page;
mod state;
/// Ledger traits.
pub mod traits;

pub use aggregate::{AggregationQuery, SchoolDirectory, StaticSchoolDirectory};
pub use error::LedgerError;
pub use filter::{
    AllRecords, AndFilter, CommittedRangeFilter, GroupFilter, QrmarkFilter, RecordFilter,
    UserFilter,
};
pub use journal::JournalLedger;
pub use memory::MemoryLedger;
pub use options::LedgerOptions;
pub use page::{paginate, RecordPage};
pub use qrmark_journal::WriteOptions;
pub use traits::{LedgerReader, RedemptionLedger};
