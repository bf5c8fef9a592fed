//! In-process ledger without persistence.

use crate::error::LedgerError;
use crate::filter::RecordFilter;
use crate::options::LedgerOptions;
use crate::state::LedgerState;
use crate::traits::{LedgerReader, RedemptionLedger};
use qrmark_canonical::{Points, UserId};
use qrmark_core::{RedemptionOutcome, RedemptionRecord, RedemptionRequest};

/// Ledger held entirely in memory. Records are lost when it is dropped.
pub struct MemoryLedger {
    state: LedgerState,
}

impl MemoryLedger {
    /// Creates an empty ledger with default options.
    pub fn new() -> Self {
        Self::with_options(LedgerOptions::default())
    }

    /// Creates an empty ledger with custom options.
    pub fn with_options(options: LedgerOptions) -> Self {
        Self {
            state: LedgerState::new(&options),
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RedemptionLedger for MemoryLedger {
    fn redeem(&self, request: &RedemptionRequest) -> Result<RedemptionOutcome, LedgerError> {
        self.state.commit(request, |_| Ok(()))
    }
}

impl LedgerReader for MemoryLedger {
    fn user_total(&self, user: UserId) -> Result<Points, LedgerError> {
        self.state.user_total(user)
    }

    fn users_total(&self, users: &[UserId]) -> Result<Points, LedgerError> {
        self.state.users_total(users)
    }

    fn scan(&self, filter: &dyn RecordFilter) -> Result<Vec<RedemptionRecord>, LedgerError> {
        self.state.scan(filter)
    }

    fn len(&self) -> Result<usize, LedgerError> {
        self.state.len()
    }
}
