pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use disk::DiskPortfolioStore;

/// Opens the portfolio database under the configured data directory.
pub fn open_default(config: &AppConfig) -> Result<DiskPortfolioStore> {
    let path = config.default_data_path()?.join("portfolio");
    DiskPortfolioStore::open(&path)
        .with_context(|| format!("Failed to open portfolio store at {}", path.display()))
}
