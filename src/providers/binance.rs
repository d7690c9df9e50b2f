use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::market::{HistoryWindow, MarketDataProvider};
use crate::core::series::{OhlcBar, OhlcSeries, PricePoint, PriceSeries};

// BinanceProvider implementation for MarketDataProvider, used as the
// fallback market data source behind CoinGecko.
pub struct BinanceProvider {
    base_url: String,
}

impl BinanceProvider {
    pub fn new(base_url: &str) -> Self {
        BinanceProvider {
            base_url: base_url.to_string(),
        }
    }

    async fn fetch_klines(&self, coin_id: &str, window: HistoryWindow) -> Result<Vec<OhlcBar>> {
        let symbol = trading_pair(coin_id);
        let end_time = Utc::now();
        let start_time = end_time - Duration::days(window.num_days() as i64);
        let url = format!(
            "{}/klines?symbol={}&interval=1d&startTime={}&endTime={}",
            self.base_url,
            symbol,
            start_time.timestamp_millis(),
            end_time.timestamp_millis()
        );
        debug!("Requesting klines from {}", url);

        let client = reqwest::Client::builder().user_agent("coinbeta/0.2").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let rows: Vec<Vec<Value>> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse klines response for {}: {}", symbol, e))?;

        if rows.is_empty() {
            return Err(anyhow!("No kline data found for pair: {}", symbol));
        }

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            bars.push(parse_kline(&row, &symbol)?);
        }
        Ok(bars)
    }
}

/// Maps a coin id onto Binance's USDT spot pair naming.
fn trading_pair(coin_id: &str) -> String {
    if coin_id == "bitcoin" {
        "BTCUSDT".to_string()
    } else {
        format!("{}USDT", coin_id.to_uppercase())
    }
}

// Kline rows are positional arrays; prices arrive as JSON strings.
fn parse_kline(row: &[Value], symbol: &str) -> Result<OhlcBar> {
    if row.len() < 5 {
        return Err(anyhow!(
            "Kline row for {} has {} fields, expected at least 5",
            symbol,
            row.len()
        ));
    }

    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| anyhow!("Kline open time is not an integer for {}", symbol))?;
    let timestamp = Utc
        .timestamp_millis_opt(open_time)
        .single()
        .ok_or_else(|| anyhow!("Kline open time {} out of range for {}", open_time, symbol))?;

    let field = |index: usize, name: &str| -> Result<f64> {
        let value = &row[index];
        match value {
            Value::String(s) => s
                .parse::<f64>()
                .map_err(|e| anyhow!("Kline {} '{}' unparseable for {}: {}", name, s, symbol, e)),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| anyhow!("Kline {} out of range for {}", name, symbol)),
            _ => Err(anyhow!("Kline {} has unexpected type for {}", name, symbol)),
        }
    };

    Ok(OhlcBar {
        timestamp,
        open: field(1, "open")?,
        high: field(2, "high")?,
        low: field(3, "low")?,
        close: field(4, "close")?,
    })
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    #[instrument(
        name = "BinancePriceHistory",
        skip(self),
        fields(coin_id = %coin_id)
    )]
    async fn fetch_price_history(
        &self,
        coin_id: &str,
        window: HistoryWindow,
    ) -> Result<PriceSeries> {
        let bars = self.fetch_klines(coin_id, window).await?;
        let series = PriceSeries::new(
            bars.iter()
                .map(|b| PricePoint {
                    timestamp: b.timestamp,
                    price: b.close,
                })
                .collect(),
        )?;
        Ok(series)
    }

    #[instrument(
        name = "BinanceOhlc",
        skip(self),
        fields(coin_id = %coin_id)
    )]
    async fn fetch_ohlc(&self, coin_id: &str, window: HistoryWindow) -> Result<OhlcSeries> {
        let bars = self.fetch_klines(coin_id, window).await?;
        Ok(OhlcSeries::new(bars)?)
    }
}
