use qrmark_core::ClaimError;
use qrmark_ledger::LedgerError;
use qrmark_ticket::{KeyError, TicketError};
use thiserror::Error;

/// Coarse classification of a [`RedeemError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Key misconfiguration. Operators must act; callers cannot.
    Operational,
    /// Untrusted input rejected by verification.
    InvalidTicket,
    /// A verified ticket whose claims are unusable. Indicates an issuance
    /// bug or tampering.
    SuspiciousClaims,
    /// Storage failure. Safe for the caller to retry.
    Transient,
    /// The caller asked for something that cannot exist, such as page 0.
    InvalidRequest,
}

/// Errors returned by [`RedemptionService`](crate::RedemptionService).
#[derive(Error, Debug)]
pub enum RedeemError {
    /// The verifying key could not be obtained.
    #[error(transparent)]
    Key(#[from] KeyError),
    /// The ticket failed verification.
    #[error(transparent)]
    Ticket(#[from] TicketError),
    /// The verified claims are unusable.
    #[error(transparent)]
    Claim(#[from] ClaimError),
    /// The ledger could not complete the operation in time.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[source] LedgerError),
    /// A listing page outside the valid range was requested.
    #[error("invalid page {page}")]
    InvalidPage {
        /// Requested page.
        page: u32,
    },
}

impl From<LedgerError> for RedeemError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidPage { page, .. } => RedeemError::InvalidPage { page },
            other => RedeemError::LedgerUnavailable(other),
        }
    }
}

impl RedeemError {
    /// Stable snake_case code distinguishing every rejection reason.
    pub fn reason_code(&self) -> &'static str {
        match self {
            RedeemError::Key(KeyError::Unavailable { .. }) => "key_unavailable",
            RedeemError::Key(KeyError::Malformed(_)) => "key_malformed",
            RedeemError::Key(KeyError::WrongType(_)) => "key_wrong_type",
            RedeemError::Ticket(TicketError::Malformed(_)) => "ticket_malformed",
            RedeemError::Ticket(TicketError::AlgorithmMismatch { .. }) => {
                "ticket_algorithm_mismatch"
            }
            RedeemError::Ticket(TicketError::SignatureInvalid) => "ticket_signature_invalid",
            RedeemError::Ticket(TicketError::Expired) => "ticket_expired",
            RedeemError::Ticket(TicketError::NotYetValid) => "ticket_not_yet_valid",
            RedeemError::Claim(ClaimError::Missing(_)) => "claim_missing",
            RedeemError::Claim(ClaimError::TypeInvalid(_)) => "claim_type_invalid",
            RedeemError::Claim(ClaimError::InvalidValue { .. }) => "claim_invalid_value",
            RedeemError::LedgerUnavailable(_) => "ledger_unavailable",
            RedeemError::InvalidPage { .. } => "invalid_page",
        }
    }

    /// Classification used for logging and caller handling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RedeemError::Key(_) => ErrorCategory::Operational,
            RedeemError::Ticket(_) => ErrorCategory::InvalidTicket,
            RedeemError::Claim(_) => ErrorCategory::SuspiciousClaims,
            RedeemError::LedgerUnavailable(_) => ErrorCategory::Transient,
            RedeemError::InvalidPage { .. } => ErrorCategory::InvalidRequest,
        }
    }

    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    /// Message safe to show the redeeming user.
    ///
    /// Ticket and claim failures collapse to one message so a caller cannot
    /// learn which check failed.
    pub fn public_message(&self) -> &'static str {
        match self.category() {
            ErrorCategory::InvalidTicket | ErrorCategory::SuspiciousClaims => "invalid ticket",
            ErrorCategory::Operational => "redemption is temporarily disabled",
            ErrorCategory::Transient => "redemption is temporarily unavailable, try again",
            ErrorCategory::InvalidRequest => "invalid request",
        }
    }
}
