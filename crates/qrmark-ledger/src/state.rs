//! Shared in-memory index behind both ledger backends.

use crate::error::LedgerError;
use crate::filter::RecordFilter;
use crate::options::LedgerOptions;
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use qrmark_canonical::{Points, Timestamp, UserId};
use qrmark_core::{RedemptionKey, RedemptionOutcome, RedemptionRecord, RedemptionRequest};
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Default)]
struct Index {
    records: Vec<RedemptionRecord>,
    by_key: HashMap<RedemptionKey, usize>,
    user_totals: HashMap<UserId, Points>,
}

impl Index {
    fn get(&self, key: &RedemptionKey) -> Option<&RedemptionRecord> {
        self.by_key.get(key).map(|&slot| &self.records[slot])
    }

    fn insert(&mut self, record: RedemptionRecord) {
        let total = self.user_totals.entry(record.user_id).or_default();
        *total = total.saturating_add(record.points);
        self.by_key.insert(record.key(), self.records.len());
        self.records.push(record);
    }
}

pub(crate) struct LedgerState {
    stripes: Box<[Mutex<()>]>,
    hasher: RandomState,
    index: RwLock<Index>,
    lock_timeout: Duration,
}

impl LedgerState {
    pub(crate) fn new(options: &LedgerOptions) -> Self {
        let stripes = (0..options.stripes.max(1)).map(|_| Mutex::new(())).collect();
        Self {
            stripes,
            hasher: RandomState::new(),
            index: RwLock::new(Index::default()),
            lock_timeout: options.lock_timeout,
        }
    }

    pub(crate) fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    fn stripe(&self, key: &RedemptionKey) -> &Mutex<()> {
        let slot = self.hasher.hash_one(key) as usize % self.stripes.len();
        &self.stripes[slot]
    }

    fn timed_out(&self, lock: &'static str) -> LedgerError {
        warn!(lock, waited_ms = self.lock_timeout.as_millis() as u64, "ledger lock timeout");
        LedgerError::LockTimeout {
            waited: self.lock_timeout,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Index>, LedgerError> {
        self.index
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| self.timed_out("index"))
    }

    /// Inserts a replayed record. Returns false when its key is already present.
    pub(crate) fn restore(&self, record: RedemptionRecord) -> bool {
        let mut index = self.index.write();
        if index.by_key.contains_key(&record.key()) {
            return false;
        }
        index.insert(record);
        true
    }

    /// Check-then-insert under the key's stripe lock.
    ///
    /// `persist` runs after the duplicate check and before the record is
    /// published. If it fails nothing is published.
    pub(crate) fn commit<F>(
        &self,
        request: &RedemptionRequest,
        persist: F,
    ) -> Result<RedemptionOutcome, LedgerError>
    where
        F: FnOnce(&RedemptionRecord) -> Result<(), LedgerError>,
    {
        let key = request.key();
        let _guard = self
            .stripe(&key)
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timed_out("stripe"))?;

        if let Some(existing) = self.read()?.get(&key) {
            return Ok(RedemptionOutcome::AlreadyRedeemed(existing.clone()));
        }

        let record = request.into_record(Timestamp::now());
        persist(&record)?;

        // Persisted: publishing must not fail from here on.
        self.index.write().insert(record.clone());
        debug!(
            qrmark_id = %record.qrmark_id,
            user_id = %record.user_id,
            points = record.points.get(),
            "redemption committed to ledger"
        );
        Ok(RedemptionOutcome::Committed(record))
    }

    pub(crate) fn user_total(&self, user: UserId) -> Result<Points, LedgerError> {
        Ok(self
            .read()?
            .user_totals
            .get(&user)
            .copied()
            .unwrap_or(Points::ZERO))
    }

    pub(crate) fn users_total(&self, users: &[UserId]) -> Result<Points, LedgerError> {
        let index = self.read()?;
        Ok(users
            .iter()
            .filter_map(|user| index.user_totals.get(user).copied())
            .sum())
    }

    pub(crate) fn scan(&self, filter: &dyn RecordFilter) -> Result<Vec<RedemptionRecord>, LedgerError> {
        Ok(self
            .read()?
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    pub(crate) fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.records.len())
    }
}
