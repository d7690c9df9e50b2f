pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod providers;

use crate::cache::Cache;
use crate::core::market::HistoryWindow;
use crate::providers::binance::BinanceProvider;
use crate::providers::coingecko::{CoinGeckoCoinListProvider, CoinGeckoProvider};
use crate::providers::fallback::FallbackProvider;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

// The coin directory changes rarely; an hour bounds staleness well enough.
const COIN_LIST_TTL: Duration = Duration::from_secs(3600);

pub enum AppCommand {
    Beta {
        coin: String,
        reference_move: Option<f64>,
    },
    Volatility {
        coin: String,
    },
    Coins {
        search: Option<String>,
        limit: usize,
    },
    Export {
        output: PathBuf,
        limit: usize,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Coin sensitivity tracker starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let window = HistoryWindow::days(config.days)?;

    // Shared caches so repeated lookups within one invocation reuse responses
    let series_cache = Arc::new(Cache::new());
    let ohlc_cache = Arc::new(Cache::new());
    let coin_list_cache = Arc::new(Cache::with_ttl(COIN_LIST_TTL));

    let coingecko_base = config
        .providers
        .coingecko
        .as_ref()
        .map_or("https://api.coingecko.com/api/v3", |p| &p.base_url);
    let binance_base = config
        .providers
        .binance
        .as_ref()
        .map_or("https://api.binance.com/api/v3", |p| &p.base_url);

    let market_provider = FallbackProvider::new(
        CoinGeckoProvider::new(
            coingecko_base,
            &config.currency,
            Arc::clone(&series_cache),
            Arc::clone(&ohlc_cache),
        ),
        BinanceProvider::new(binance_base),
    );
    let coin_list_provider =
        CoinGeckoCoinListProvider::new(coingecko_base, Arc::clone(&coin_list_cache));

    match command {
        AppCommand::Beta {
            coin,
            reference_move,
        } => {
            cli::beta::run(
                &market_provider,
                &config.reference,
                &coin,
                window,
                reference_move,
            )
            .await
        }
        AppCommand::Volatility { coin } => {
            cli::volatility::run(&market_provider, &config.reference, &coin, window).await
        }
        AppCommand::Coins { search, limit } => {
            cli::coins::run(&coin_list_provider, search.as_deref(), limit).await
        }
        AppCommand::Export { output, limit } => {
            cli::export::run(
                &market_provider,
                &config.reference,
                &config.watchlist,
                window,
                &output,
                limit,
            )
            .await
        }
    }
}
