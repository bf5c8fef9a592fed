//! Projection of an untyped claim map into [`RedemptionClaims`].
//!
//! Signed-token encoders commonly write every number as a JSON double, so a
//! claim of `5.0` is accepted as `5`. Anything that cannot be represented
//! exactly as an integer is rejected rather than truncated.

use crate::errors::ClaimError;
use crate::records::RedemptionClaims;
use qrmark_canonical::{GroupId, Points, QrmarkId};
use serde_json::{Map, Value};

/// Untyped claim map as produced by ticket verification.
pub type ClaimMap = Map<String, Value>;

/// Claim carrying the qrmark id.
pub const QRMARK_CLAIM: &str = "sub";
/// Claim carrying the company or group id.
pub const GROUP_CLAIM: &str = "num";
/// Claim carrying the point value.
pub const POINT_CLAIM: &str = "point";

/// Largest integer a double represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Type-checks verified claims into a [`RedemptionClaims`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimExtractor;

impl ClaimExtractor {
    /// Creates an extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extracts the three mandatory redemption claims.
    ///
    /// # Errors
    ///
    /// - [`ClaimError::Missing`] if a claim is absent
    /// - [`ClaimError::TypeInvalid`] if a claim is not an exact integer
    /// - [`ClaimError::InvalidValue`] if a claim is negative
    pub fn extract(&self, claims: &ClaimMap) -> Result<RedemptionClaims, ClaimError> {
        let qrmark_id = non_negative(claims, QRMARK_CLAIM)?;
        let group_id = non_negative(claims, GROUP_CLAIM)?;
        let points = non_negative(claims, POINT_CLAIM)?;

        Ok(RedemptionClaims {
            qrmark_id: QrmarkId::new(qrmark_id),
            group_id: GroupId::new(group_id),
            points: Points::new(points),
        })
    }
}

fn non_negative(claims: &ClaimMap, name: &'static str) -> Result<u64, ClaimError> {
    let value = claims.get(name).ok_or(ClaimError::Missing(name))?;
    let integer = integral(value).ok_or(ClaimError::TypeInvalid(name))?;
    u64::try_from(integer).map_err(|_| ClaimError::InvalidValue {
        name,
        value: integer.to_string(),
    })
}

fn integral(value: &Value) -> Option<i128> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(v) = number.as_u64() {
        return Some(i128::from(v));
    }
    if let Some(v) = number.as_i64() {
        return Some(i128::from(v));
    }
    let v = number.as_f64()?;
    if !v.is_finite() || v.fract() != 0.0 || v.abs() > MAX_SAFE_INTEGER {
        return None;
    }
    // Exact: |v| <= 2^53 with no fractional part.
    Some(v as i128)
}
