//! Ticket envelope parsing and ES256 signature verification.

use crate::errors::TicketError;
use crate::key::VerifyingKey;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};
use serde_json::{Map, Value};

/// The only signing algorithm a ticket may declare.
pub const EXPECTED_ALGORITHM: &str = "ES256";

/// Claims of a ticket whose signature and temporal claims verified.
///
/// The map is returned exactly as signed; typing happens downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedClaims(Map<String, Value>);

impl VerifiedClaims {
    /// Borrows the claim map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes into the claim map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Looks up a single claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// Verifies compact ES256 tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketVerifier {
    leeway_secs: u64,
}

impl TicketVerifier {
    /// Creates a verifier with zero clock-skew leeway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a verifier tolerating `leeway_secs` of clock skew on `exp`/`nbf`.
    pub fn with_leeway(leeway_secs: u64) -> Self {
        Self { leeway_secs }
    }

    /// Verifies `ticket` against `key` at the current time.
    pub fn verify(&self, ticket: &str, key: &VerifyingKey) -> Result<VerifiedClaims, TicketError> {
        self.verify_at(ticket, key, chrono::Utc::now().timestamp())
    }

    /// Verifies `ticket` against `key` as of the Unix time `now`.
    ///
    /// The header is inspected before any cryptography so that a ticket
    /// declaring another algorithm is rejected no matter which key could
    /// verify it.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Malformed`] for a broken envelope, header or payload
    /// - [`TicketError::AlgorithmMismatch`] if the header `alg` is not `ES256`
    /// - [`TicketError::SignatureInvalid`] if the signature does not verify
    /// - [`TicketError::Expired`] / [`TicketError::NotYetValid`] for `exp`/`nbf`
    pub fn verify_at(
        &self,
        ticket: &str,
        key: &VerifyingKey,
        now: i64,
    ) -> Result<VerifiedClaims, TicketError> {
        let ticket = ticket.trim();
        let algorithm = declared_algorithm(ticket)?;
        if algorithm != EXPECTED_ALGORITHM {
            return Err(TicketError::AlgorithmMismatch { found: algorithm });
        }

        let mut validation = Validation::new(Algorithm::ES256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        let data = jsonwebtoken::decode::<Map<String, Value>>(ticket, key.decoding_key(), &validation)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => TicketError::SignatureInvalid,
                ErrorKind::InvalidAlgorithm => TicketError::AlgorithmMismatch {
                    found: algorithm.clone(),
                },
                _ => TicketError::Malformed(err.to_string()),
            })?;

        check_temporal(&data.claims, now, self.leeway_secs)?;
        Ok(VerifiedClaims(data.claims))
    }
}

fn declared_algorithm(ticket: &str) -> Result<String, TicketError> {
    let mut segments = ticket.split('.');
    let (Some(header), Some(_payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TicketError::Malformed(
            "expected three dot-separated segments".to_string(),
        ));
    };
    if header.is_empty() {
        return Err(TicketError::Malformed("empty header segment".to_string()));
    }

    let header_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| TicketError::Malformed(format!("header is not base64url: {}", e)))?;
    let header: Map<String, Value> = serde_json::from_slice(&header_bytes)
        .map_err(|e| TicketError::Malformed(format!("header is not a JSON object: {}", e)))?;

    header
        .get("alg")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TicketError::Malformed("header has no alg".to_string()))
}

fn check_temporal(claims: &Map<String, Value>, now: i64, leeway: u64) -> Result<(), TicketError> {
    let now = now as f64;
    let leeway = leeway as f64;

    if let Some(exp) = numeric_date(claims, "exp")? {
        if now - leeway >= exp {
            return Err(TicketError::Expired);
        }
    }
    if let Some(nbf) = numeric_date(claims, "nbf")? {
        if now + leeway < nbf {
            return Err(TicketError::NotYetValid);
        }
    }
    Ok(())
}

fn numeric_date(claims: &Map<String, Value>, name: &str) -> Result<Option<f64>, TicketError> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| TicketError::Malformed(format!("{} is not a NumericDate", name))),
    }
}
