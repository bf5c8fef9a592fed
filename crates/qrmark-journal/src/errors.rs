use thiserror::Error;

/// Errors that can occur during journal operations.
#[derive(Error, Debug)]
pub enum JournalError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid file header.
    #[error("invalid journal header: {0}")]
    InvalidHeader(String),
    /// Invalid frame prefix.
    #[error("invalid frame at offset {offset}: {reason}")]
    InvalidFrame {
        /// Byte offset where the frame starts.
        offset: u64,
        /// Reason for invalidity.
        reason: String,
    },
    /// Payload exceeds maximum size limit.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual payload size.
        size: u64,
        /// Maximum allowed size.
        max: u32,
    },
    /// Invalid UTF-8 in a record payload.
    #[error("invalid UTF-8 in record payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// Record payload is not a valid redemption record.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Existing file is shorter than the journal header.
    #[error("journal header truncated: file holds {len} bytes")]
    HeaderTruncated {
        /// File length in bytes.
        len: u64,
    },
    /// A failed append could not be rolled back, so the file may end in a torn frame.
    #[error("journal writer disabled after a failed rollback; reopen to repair")]
    WriterFailed,
    /// Truncated frame detected in strict mode.
    #[error("truncated frame at offset {offset}")]
    TruncatedFrame {
        /// Byte offset where truncation occurred.
        offset: u64,
    },
}
