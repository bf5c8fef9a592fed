//! Redemption domain types and claim extraction for qrmark.
//!
//! This crate provides:
//! - [`RedemptionClaims`]: the typed projection of a verified ticket
//! - [`RedemptionRequest`]: claims joined with the session's requester id
//! - [`RedemptionRecord`]: the append-only fact persisted by a ledger
//! - [`RedemptionOutcome`]: `Committed` or `AlreadyRedeemed`
//! - [`ClaimExtractor`]: strict integer coercion of untyped claim maps
//!
//! Core invariants:
//! - A requester id never comes from a ticket
//! - Untyped claim data never reaches a ledger
//! - At most one record exists per [`RedemptionKey`]
//!
#![deny(missing_docs)]

/// Claim extraction from verified claim maps.
pub mod claims;
/// Error types for claim extraction.
pub mod errors;
/// Redemption requests, records and outcomes.
pub mod records;

pub use claims::{ClaimExtractor, ClaimMap, GROUP_CLAIM, POINT_CLAIM, QRMARK_CLAIM};
pub use errors::ClaimError;
pub use records::{
    RedemptionClaims, RedemptionKey, RedemptionOutcome, RedemptionRecord, RedemptionRequest,
};
