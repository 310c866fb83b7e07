pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::menu::App;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::{Catalog, FxError, PortfolioStore, Session};
use crate::providers::OpenExchangeRatesProvider;
use anyhow::Result;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Menu,
    Rates,
    Portfolio(String),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with_io(command, &config, stdin.lock(), stdout.lock()).await
}

/// Runs `command` against the configured provider and store, reading answers
/// from `input` and writing everything shown to the user to `output`.
pub async fn run_with_io<R: BufRead, W: Write>(
    command: AppCommand,
    config: &AppConfig,
    input: R,
    output: W,
) -> Result<()> {
    info!("fx-trader starting...");
    let catalog = Catalog::standard();

    let api_key = config.api_key()?;
    let cache = Arc::new(Cache::new(config.rates_ttl()));
    let rates = OpenExchangeRatesProvider::new(
        &config.providers.open_exchange_rates.base_url,
        &api_key,
        catalog,
        cache,
    )?;
    let store = store::open_default(config)?;

    let mut app = App::new(catalog, &store, &rates, input, output);
    match command {
        AppCommand::Menu => app.run().await,
        AppCommand::Rates => app.show_rates().await,
        AppCommand::Portfolio(user) => {
            let session = Session::new(&user)?;
            if !store.portfolio_exists(&session)? {
                return Err(FxError::PortfolioNotFound(session.username().to_string()).into());
            }
            app.with_session(session).show_portfolio()
        }
    }
}
