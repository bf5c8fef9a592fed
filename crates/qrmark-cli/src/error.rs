use qrmark_journal::JournalError;
use qrmark_service::{ConfigError, RedeemError};
use thiserror::Error;

/// Exit status for failures the caller may retry (EX_TEMPFAIL).
pub const EXIT_RETRY: i32 = 75;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}: {}", .0.reason_code(), .0)]
    Redeem(#[from] RedeemError),

    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("failed to read ticket: {0}")]
    Input(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("journal has {0} duplicate redemption(s)")]
    AuditFailed(usize),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Redeem(err) if err.is_retryable() => EXIT_RETRY,
            _ => 1,
        }
    }
}
