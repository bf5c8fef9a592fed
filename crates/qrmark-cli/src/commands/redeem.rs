//! Redeem command implementation.

use super::load_service;
use crate::error::CliError;
use crate::input::read_ticket;
use crate::output;
use qrmark_canonical::UserId;
use std::path::PathBuf;

pub fn run(config: PathBuf, user: u64, ticket: Option<String>, json: bool) -> Result<(), CliError> {
    let ticket = read_ticket(ticket)?;
    let service = load_service(&config)?;

    let outcome = service.verify_and_redeem(&ticket, UserId::new(user))?;
    if json {
        println!("{}", output::format_json(&outcome)?);
    } else {
        println!("{}", output::format_outcome(outcome.label(), outcome.record()));
    }
    Ok(())
}
