use std::time::Duration;

/// Default bound on any single lock wait.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of per-key lock stripes.
pub const DEFAULT_STRIPES: usize = 64;

/// Ledger tuning options.
#[derive(Debug, Clone)]
pub struct LedgerOptions {
    /// Upper bound on waiting for any ledger lock.
    pub lock_timeout: Duration,
    /// Number of lock stripes keys are hashed onto (minimum 1).
    pub stripes: usize,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            stripes: DEFAULT_STRIPES,
        }
    }
}

impl LedgerOptions {
    /// Options with a custom lock timeout.
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            lock_timeout,
            ..Self::default()
        }
    }
}
