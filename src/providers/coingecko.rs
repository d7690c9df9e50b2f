use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cache::Cache;
use crate::core::market::{CoinInfo, CoinListProvider, HistoryWindow, MarketDataProvider};
use crate::core::series::{OhlcBar, OhlcSeries, PricePoint, PriceSeries};
use crate::providers::util::with_retry;

const COIN_LIST_CACHE_KEY: &str = "coingecko";

// CoinGeckoProvider implementation for MarketDataProvider
pub struct CoinGeckoProvider {
    base_url: String,
    currency: String,
    series_cache: Arc<Cache<String, PriceSeries>>,
    ohlc_cache: Arc<Cache<String, OhlcSeries>>,
}

impl CoinGeckoProvider {
    pub fn new(
        base_url: &str,
        currency: &str,
        series_cache: Arc<Cache<String, PriceSeries>>,
        ohlc_cache: Arc<Cache<String, OhlcSeries>>,
    ) -> Self {
        CoinGeckoProvider {
            base_url: base_url.to_string(),
            currency: currency.to_string(),
            series_cache,
            ohlc_cache,
        }
    }

    async fn get_json(&self, url: &str, coin_id: &str) -> Result<String> {
        let client = reqwest::Client::builder().user_agent("coinbeta/0.2").build()?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for coin: {} URL: {}", e, coin_id, url))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(anyhow!("Unknown coin: {}", coin_id));
        }
        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for coin: {}",
                response.status(),
                coin_id
            ));
        }

        Ok(response.text().await?)
    }
}

#[derive(Deserialize, Debug)]
struct MarketChartResponse {
    prices: Vec<(i64, f64)>,
}

/// Drops rows a well-formed response should not contain: unparseable
/// timestamps, non-positive prices, out-of-order rows.
fn sanitize_points(raw: Vec<(i64, f64)>, coin_id: &str) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = Vec::with_capacity(raw.len());
    for (ms, price) in raw {
        let Some(timestamp) = Utc.timestamp_millis_opt(ms).single() else {
            debug!("Skipping unparseable timestamp {} for {}", ms, coin_id);
            continue;
        };
        if !price.is_finite() || price <= 0.0 {
            debug!("Skipping non-positive price {} for {}", price, coin_id);
            continue;
        }
        if let Some(last) = points.last() {
            if timestamp <= last.timestamp {
                debug!("Skipping out-of-order row at {} for {}", ms, coin_id);
                continue;
            }
        }
        points.push(PricePoint { timestamp, price });
    }
    points
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    #[instrument(
        name = "CoinGeckoPriceHistory",
        skip(self),
        fields(coin_id = %coin_id)
    )]
    async fn fetch_price_history(
        &self,
        coin_id: &str,
        window: HistoryWindow,
    ) -> Result<PriceSeries> {
        let cache_key = format!("{}:{}", coin_id, window.num_days());
        if let Some(cached) = self.series_cache.get(&cache_key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}&interval=daily",
            self.base_url,
            coin_id,
            self.currency,
            window.num_days()
        );
        debug!("Requesting price history from {}", url);

        let text = self.get_json(&url, coin_id).await?;
        let data: MarketChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse market chart for {}: {}", coin_id, e))?;

        if data.prices.is_empty() {
            return Err(anyhow!("No price history found for coin: {}", coin_id));
        }

        let series = PriceSeries::new(sanitize_points(data.prices, coin_id))?;
        self.series_cache.put(cache_key, series.clone()).await;

        Ok(series)
    }

    #[instrument(
        name = "CoinGeckoOhlc",
        skip(self),
        fields(coin_id = %coin_id)
    )]
    async fn fetch_ohlc(&self, coin_id: &str, window: HistoryWindow) -> Result<OhlcSeries> {
        let cache_key = format!("{}:{}", coin_id, window.num_days());
        if let Some(cached) = self.ohlc_cache.get(&cache_key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/coins/{}/ohlc?vs_currency={}&days={}",
            self.base_url,
            coin_id,
            self.currency,
            window.num_days()
        );
        debug!("Requesting OHLC bars from {}", url);

        let text = self.get_json(&url, coin_id).await?;
        let rows: Vec<(i64, f64, f64, f64, f64)> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse OHLC response for {}: {}", coin_id, e))?;

        if rows.is_empty() {
            return Err(anyhow!("No OHLC data found for coin: {}", coin_id));
        }

        let mut bars: Vec<OhlcBar> = Vec::with_capacity(rows.len());
        for (ms, open, high, low, close) in rows {
            let Some(timestamp) = Utc.timestamp_millis_opt(ms).single() else {
                debug!("Skipping unparseable timestamp {} for {}", ms, coin_id);
                continue;
            };
            if let Some(last) = bars.last() {
                if timestamp <= last.timestamp {
                    debug!("Skipping out-of-order bar at {} for {}", ms, coin_id);
                    continue;
                }
            }
            bars.push(OhlcBar {
                timestamp,
                open,
                high,
                low,
                close,
            });
        }

        let series = OhlcSeries::new(bars)?;
        self.ohlc_cache.put(cache_key, series.clone()).await;

        Ok(series)
    }
}

// CoinGeckoCoinListProvider implementation for CoinListProvider
pub struct CoinGeckoCoinListProvider {
    base_url: String,
    cache: Arc<Cache<String, Vec<CoinInfo>>>,
}

impl CoinGeckoCoinListProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Vec<CoinInfo>>>) -> Self {
        CoinGeckoCoinListProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[async_trait]
impl CoinListProvider for CoinGeckoCoinListProvider {
    async fn fetch_coin_list(&self) -> Result<Vec<CoinInfo>> {
        if let Some(cached) = self.cache.get(&COIN_LIST_CACHE_KEY.to_string()).await {
            return Ok(cached);
        }

        let url = format!("{}/coins/list", self.base_url);
        debug!("Requesting coin list from {}", url);

        let client = reqwest::Client::builder().user_agent("coinbeta/0.2").build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 3, 500)
            .await
            .map_err(|e| anyhow!("Request error: {} for coin list URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for coin list", response.status()));
        }

        let text = response.text().await?;
        let coins: Vec<CoinInfo> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse coin list response: {}", e))?;

        if coins.is_empty() {
            return Err(anyhow!("Coin list response was empty"));
        }

        self.cache
            .put(COIN_LIST_CACHE_KEY.to_string(), coins.clone())
            .await;
        Ok(coins)
    }
}
