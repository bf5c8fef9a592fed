//! List command implementation.

use super::load_service;
use crate::error::CliError;
use crate::output;
use qrmark_canonical::UserId;
use std::path::PathBuf;

pub fn run(config: PathBuf, user: Option<u64>, page: u32, json: bool) -> Result<(), CliError> {
    let service = load_service(&config)?;
    let page = service.list_redemptions(user.map(UserId::new), page)?;

    if json {
        println!("{}", output::format_json(&page)?);
        return Ok(());
    }

    output::print_table_header();
    for record in &page.records {
        println!("{}", output::format_table_row(record));
    }
    if page.has_next {
        println!("(more: --page {})", page.page + 1);
    }
    Ok(())
}
