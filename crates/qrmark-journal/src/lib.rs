//! Append-only journal format for committed qrmark redemptions.
//!
//! This crate provides:
//! - Framed, append-only storage of [`RedemptionRecord`](qrmark_core::RedemptionRecord)s
//! - Reader/writer APIs with strict and permissive truncation handling
//! - An offline audit of the one-record-per-key invariant
//!
//! ## Format
//!
//! A 16-byte header (`QRJ1`, version `0x0001`, zero flags and reserved
//! bytes) followed by frames of `kind:u8 | reserved:[u8;3] | len:u32le |
//! payload`. Kind `0x01` carries one record as UTF-8 JSON. Other kinds are
//! read as [`Frame::Opaque`] and skipped by [`JournalReader::read_record`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qrmark_journal::{JournalReader, JournalWriter, ReadMode, WriteOptions};
//!
//! let writer = JournalWriter::open("redemptions.qrj", WriteOptions::default())?;
//! writer.finish()?;
//!
//! let mut reader = JournalReader::open("redemptions.qrj", ReadMode::Strict)?;
//! assert!(reader.read_record()?.is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Journal audit.
pub mod audit;
/// Error types for journal operations.
pub mod errors;
/// On-disk layout and frame encoding.
pub mod frame;
/// Journal reader implementation.
pub mod reader;
/// Journal writer implementation.
pub mod writer;

pub use audit::{audit_journal, JournalAudit};
pub use errors::JournalError;
pub use frame::Frame;
pub use reader::{JournalReader, ReadMode};
pub use writer::{JournalWriter, WriteOptions};
