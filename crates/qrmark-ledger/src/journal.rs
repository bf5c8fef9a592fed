//! Ledger persisted to an append-only journal file.

use crate::error::LedgerError;
use crate::filter::RecordFilter;
use crate::options::LedgerOptions;
use crate::state::LedgerState;
use crate::traits::{LedgerReader, RedemptionLedger};
use parking_lot::Mutex;
use qrmark_canonical::{Points, UserId};
use qrmark_core::{RedemptionOutcome, RedemptionRecord, RedemptionRequest};
use qrmark_journal::{JournalReader, JournalWriter, ReadMode, WriteOptions};
use std::path::Path;
use tracing::{debug, info, warn};

/// Ledger whose records are appended to a journal before they are published.
///
/// On open the journal is replayed to rebuild the in-memory index. A torn
/// tail left by a crash is truncated first when `repair_tail` is set.
pub struct JournalLedger {
    state: LedgerState,
    writer: Mutex<JournalWriter>,
}

impl JournalLedger {
    /// Opens (or creates) the journal at `path` and replays it.
    pub fn open<P: AsRef<Path>>(
        path: P,
        write_options: WriteOptions,
        options: LedgerOptions,
    ) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let writer = JournalWriter::open(path, write_options)?;
        let state = LedgerState::new(&options);

        let mut reader = JournalReader::open(path, ReadMode::Strict)?;
        let mut replayed = 0usize;
        while let Some(record) = reader.read_record()? {
            let key = record.key();
            if state.restore(record) {
                replayed += 1;
            } else {
                warn!(
                    qrmark_id = %key.qrmark_id,
                    user_id = %key.user_id,
                    "duplicate redemption in journal ignored"
                );
            }
        }
        info!(path = %path.display(), records = replayed, "journal replayed");

        Ok(Self {
            state,
            writer: Mutex::new(writer),
        })
    }

    /// Opens with default write and ledger options.
    pub fn open_default<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        Self::open(path, WriteOptions::default(), LedgerOptions::default())
    }
}

impl RedemptionLedger for JournalLedger {
    fn redeem(&self, request: &RedemptionRequest) -> Result<RedemptionOutcome, LedgerError> {
        let timeout = self.state.lock_timeout();
        self.state.commit(request, |record| {
            let mut writer = self
                .writer
                .try_lock_for(timeout)
                .ok_or(LedgerError::LockTimeout { waited: timeout })?;
            writer.append_record(record)?;
            debug!(journal_len = writer.len(), "redemption appended");
            Ok(())
        })
    }
}

impl LedgerReader for JournalLedger {
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
