use anyhow::Result;
use clap::{Parser, Subcommand};
use fx_trader::AppCommand;
use fx_trader::cli::setup::{setup, setup_at_path};
use fx_trader::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Start the interactive trading menu (default)
    Menu,
    /// Display the latest FX rates
    Rates,
    /// Display a user's portfolio
    Portfolio {
        /// Username whose balances are shown
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = match cli.command {
        Some(Commands::Setup) => None,
        Some(Commands::Menu) | None => Some(AppCommand::Menu),
        Some(Commands::Rates) => Some(AppCommand::Rates),
        Some(Commands::Portfolio { user }) => Some(AppCommand::Portfolio(user)),
    };
    let result = match command {
        Some(command) => fx_trader::run_command(command, cli.config_path.as_deref()).await,
        None => match cli.config_path.as_deref() {
            Some(path) => setup_at_path(path),
            None => setup(),
        },
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
