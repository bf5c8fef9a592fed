pub mod audit;
pub mod list;
pub mod redeem;
pub mod total;
pub mod verify;

use crate::error::CliError;
use qrmark_service::{RedemptionService, ServiceConfig};
use std::path::Path;

/// Loads configuration, applies `QRMARK_*` overrides and builds the service.
pub fn load_service(config_path: &Path) -> Result<RedemptionService, CliError> {
    let mut config = ServiceConfig::from_file(config_path)?;
    config.apply_env()?;
    tracing::debug!(
        config = %config_path.display(),
        journal = ?config.journal_path,
        "configuration loaded"
    );
    Ok(RedemptionService::from_config(&config)?)
}
