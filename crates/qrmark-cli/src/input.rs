use crate::error::CliError;
use std::io::Read;

/// Returns the ticket argument, reading stdin when it is absent or `-`.
pub fn read_ticket(arg: Option<String>) -> Result<String, CliError> {
    let raw = match arg.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(ticket) => ticket.to_string(),
    };
    let ticket = raw.trim();
    if ticket.is_empty() {
        return Err(CliError::Argument("empty ticket".to_string()));
    }
    Ok(ticket.to_string())
}
