//! Total command implementation.

use super::load_service;
use crate::error::CliError;
use qrmark_canonical::{SchoolId, UserId};
use std::path::PathBuf;

pub fn user(config: PathBuf, id: u64) -> Result<(), CliError> {
    let service = load_service(&config)?;
    println!("{}", service.get_user_total_points(UserId::new(id))?);
    Ok(())
}

pub fn school(config: PathBuf, id: u64) -> Result<(), CliError> {
    let service = load_service(&config)?;
    println!("{}", service.get_school_total_points(SchoolId::new(id))?);
    Ok(())
}
