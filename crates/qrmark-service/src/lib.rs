//! Single entry point for qrmark ticket redemption.
//!
//! [`RedemptionService`] composes key loading, ticket verification, claim
//! extraction and the ledger into `verify_and_redeem`, and exposes the
//! read-only point totals and record listing.
//!
//! Every rejection is a [`RedeemError`] with a stable
//! [`reason_code`](RedeemError::reason_code). `AlreadyRedeemed` is an
//! outcome, not an error.

#![deny(missing_docs)]

/// Service configuration.
pub mod config;
/// Outbound error taxonomy.
pub mod errors;
/// Redemption orchestration.
pub mod service;

pub use config::{ConfigError, SchoolConfig, ServiceConfig};
pub use errors::{ErrorCategory, RedeemError};
pub use service::RedemptionService;
