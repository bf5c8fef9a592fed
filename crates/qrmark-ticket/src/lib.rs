//! Ticket verification for qrmark redemptions.
//!
//! A ticket is a compact JWS (`header.payload.signature`) signed with ECDSA
//! over P-256 (`ES256`). This crate provides:
//! - [`KeyProvider`]: loads and caches the operator-provisioned public key
//! - [`TicketVerifier`]: pins the algorithm, checks the signature and the
//!   `exp`/`nbf` temporal claims, and hands back the untouched claim map
//!
//! Verification is all-or-nothing: there is no partially trusted result.
//!
//! ## Example
//!
//! ```rust,no_run
//! use qrmark_ticket::{KeyProvider, TicketVerifier};
//!
//! let provider = KeyProvider::from_path("/etc/qrmark/ecdsa_p256_public_key.pem");
//! let key = provider.get_verifying_key()?;
//! let claims = TicketVerifier::new().verify("eyJ...", &key)?;
//! println!("qrmark {:?}", claims.get("sub"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Error types for key loading and ticket verification.
pub mod errors;
/// Verifying key decoding and caching.
pub mod key;
/// Ticket envelope parsing and signature verification.
pub mod verifier;

pub use errors::{KeyError, TicketError};
pub use key::{KeyProvider, KeySource, VerifyingKey};
pub use verifier::{TicketVerifier, VerifiedClaims, EXPECTED_ALGORITHM};
