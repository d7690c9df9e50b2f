//! Market data abstractions

use crate::core::error::AnalysisError;
use crate::core::series::{OhlcSeries, PriceSeries};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Requested price history look-back, in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    days: u32,
}

impl HistoryWindow {
    pub const DEFAULT_DAYS: u32 = 14;

    pub fn days(days: u32) -> Result<Self, AnalysisError> {
        if days == 0 {
            return Err(AnalysisError::invalid_input(
                "history window must cover at least one day",
            ));
        }
        Ok(HistoryWindow { days })
    }

    pub fn num_days(&self) -> u32 {
        self.days
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow {
            days: Self::DEFAULT_DAYS,
        }
    }
}

/// A directory entry from a market data source's coin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinInfo {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

impl CoinInfo {
    /// Case-insensitive substring match over id, symbol, and name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.id.to_lowercase().contains(&query)
            || self.symbol.to_lowercase().contains(&query)
            || self.name.to_lowercase().contains(&query)
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_price_history(&self, id: &str, window: HistoryWindow) -> Result<PriceSeries>;

    async fn fetch_ohlc(&self, id: &str, window: HistoryWindow) -> Result<OhlcSeries>;
}

#[async_trait]
pub trait CoinListProvider: Send + Sync {
    async fn fetch_coin_list(&self) -> Result<Vec<CoinInfo>>;
}
