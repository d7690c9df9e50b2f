use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use coinbeta::core::log::init_logging;
use std::path::PathBuf;

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

impl From<Commands> for coinbeta::AppCommand {
    fn from(cmd: Commands) -> coinbeta::AppCommand {
        match cmd {
            Commands::Beta {
                coin,
                reference_move,
            } => coinbeta::AppCommand::Beta {
                coin,
                reference_move,
            },
            Commands::Volatility { coin } => coinbeta::AppCommand::Volatility { coin },
            Commands::Coins { search, limit } => coinbeta::AppCommand::Coins { search, limit },
            Commands::Export { output, limit } => coinbeta::AppCommand::Export { output, limit },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display beta and volatility ratio for a coin
    Beta {
        /// Coin id, e.g. "ethereum"
        coin: String,
        /// Hypothetical reference move in percent to project onto the coin
        #[arg(long = "move", allow_hyphen_values = true)]
        reference_move: Option<f64>,
    },
    /// Display the ATR-based volatility multiplier for a coin
    Volatility {
        /// Coin id, e.g. "ethereum"
        coin: String,
    },
    /// List or search the coin directory
    Coins {
        /// Case-insensitive substring over id, symbol, and name
        #[arg(long)]
        search: Option<String>,
        /// Maximum number of coins to display
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Export watchlist betas to a CSV file
    Export {
        /// Output file path
        #[arg(short, long, default_value = "coinbeta_export.csv")]
        output: PathBuf,
        /// Maximum number of watchlist coins to analyze
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => coinbeta::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = coinbeta::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
reference: "bitcoin"

watchlist:
  - "ethereum"
  - "solana"

providers:
  coingecko:
    base_url: "https://api.coingecko.com/api/v3"
  binance:
    base_url: "https://api.binance.com/api/v3"

currency: "usd"
days: 14
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
