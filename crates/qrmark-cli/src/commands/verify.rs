//! Verify command implementation.

use crate::error::CliError;
use crate::input::read_ticket;
use crate::output;
use qrmark_core::ClaimExtractor;
use qrmark_service::RedeemError;
use qrmark_ticket::{KeyProvider, TicketVerifier};
use serde_json::json;
use std::path::PathBuf;

pub fn run(key: PathBuf, ticket: Option<String>, leeway: u64) -> Result<(), CliError> {
    let ticket = read_ticket(ticket)?;
    let provider = KeyProvider::from_path(&key);
    let key = provider.get_verifying_key().map_err(RedeemError::from)?;
    eprintln!("key fingerprint: {}", key.fingerprint());

    let claims = TicketVerifier::with_leeway(leeway)
        .verify(&ticket, &key)
        .map_err(RedeemError::from)?;
    let extracted = ClaimExtractor::new().extract(claims.as_map());

    let report = json!({
        "claims": claims.as_map(),
        "redemption": extracted.as_ref().ok(),
    });
    println!("{}", output::format_json(&report)?);

    extracted.map_err(RedeemError::from)?;
    Ok(())
}
