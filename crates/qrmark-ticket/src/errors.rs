use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while obtaining the verifying key.
///
/// These indicate operator misconfiguration, never user input.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The key source is missing or unreadable.
    #[error("verifying key unavailable at {path}: {source}")]
    Unavailable {
        /// Location that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The key bytes are not valid PEM/DER.
    #[error("verifying key malformed: {0}")]
    Malformed(String),
    /// The key decoded but is not a P-256 elliptic-curve public key.
    #[error("verifying key has wrong type: {0}")]
    WrongType(String),
}

/// Reasons a ticket is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// The envelope or payload cannot be parsed.
    #[error("ticket malformed: {0}")]
    Malformed(String),
    /// The header declares an algorithm other than the pinned one.
    #[error("ticket algorithm '{found}' is not accepted")]
    AlgorithmMismatch {
        /// Algorithm declared by the ticket header.
        found: String,
    },
    /// The signature does not verify under the configured key.
    #[error("ticket signature invalid")]
    SignatureInvalid,
    /// The `exp` claim is in the past.
    #[error("ticket expired")]
    Expired,
    /// The `nbf` claim is in the future.
    #[error("ticket not yet valid")]
    NotYetValid,
}
