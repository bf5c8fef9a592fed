//! Primitive value types shared by every qrmark crate.
//!
//! Identifiers are non-negative integers wrapped in newtypes so that a qrmark
//! id can never be passed where a user id is expected. Timestamps are UTC
//! RFC3339 strings with a `Z` suffix, matching what the journal persists.
//!
#![deny(missing_docs)]

/// Identifier newtypes for qrmarks, users, groups and schools.
pub mod identifiers;
/// Point values.
pub mod points;
/// UTC timestamps.
pub mod timestamp;
/// Validation errors for primitive construction.
pub mod validation;

pub use identifiers::{GroupId, QrmarkId, SchoolId, UserId};
pub use points::Points;
pub use timestamp::Timestamp;
pub use validation::ValidationError;
