use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::core::market::{HistoryWindow, MarketDataProvider};
use crate::core::series::{OhlcSeries, PriceSeries};

/// Tries a primary market data source and falls back to a secondary one
/// when the primary fails. When both fail, the secondary's error is the
/// one reported.
pub struct FallbackProvider<P: MarketDataProvider, S: MarketDataProvider> {
    primary: P,
    secondary: S,
}

impl<P: MarketDataProvider, S: MarketDataProvider> FallbackProvider<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P: MarketDataProvider, S: MarketDataProvider> MarketDataProvider for FallbackProvider<P, S> {
    async fn fetch_price_history(
        &self,
        coin_id: &str,
        window: HistoryWindow,
    ) -> Result<PriceSeries> {
        match self.primary.fetch_price_history(coin_id, window).await {
            Ok(series) => Ok(series),
            Err(e) => {
                warn!(
                    "Primary source failed for {} price history: {}. Trying fallback...",
                    coin_id, e
                );
                self.secondary.fetch_price_history(coin_id, window).await
            }
        }
    }

    async fn fetch_ohlc(&self, coin_id: &str, window: HistoryWindow) -> Result<OhlcSeries> {
        match self.primary.fetch_ohlc(coin_id, window).await {
            Ok(series) => Ok(series),
            Err(e) => {
                warn!(
                    "Primary source failed for {} OHLC: {}. Trying fallback...",
                    coin_id, e
                );
                self.secondary.fetch_ohlc(coin_id, window).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::PricePoint;
    use anyhow::anyhow;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        fail: bool,
        calls: AtomicUsize,
        price: f64,
    }

    impl StubProvider {
        fn ok(price: f64) -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
                price,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
                price: 0.0,
            }
        }

        fn series(&self) -> PriceSeries {
            PriceSeries::new(vec![
                PricePoint {
                    timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                    price: self.price,
                },
                PricePoint {
                    timestamp: Utc.timestamp_opt(1_700_086_400, 0).unwrap(),
                    price: self.price * 1.01,
                },
            ])
            .unwrap()
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn fetch_price_history(
            &self,
            _coin_id: &str,
            _window: HistoryWindow,
        ) -> Result<PriceSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(anyhow!("source unavailable"))
            } else {
                Ok(self.series())
            }
        }

        async fn fetch_ohlc(&self, _coin_id: &str, _window: HistoryWindow) -> Result<OhlcSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("source unavailable"))
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let provider = FallbackProvider::new(StubProvider::ok(100.0), StubProvider::ok(200.0));

        let series = provider
            .fetch_price_history("bitcoin", HistoryWindow::default())
            .await
            .unwrap();

        let first: Vec<f64> = series.prices().collect();
        assert_eq!(first[0], 100.0);
        assert_eq!(provider.secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_primary_failure() {
        let provider = FallbackProvider::new(StubProvider::failing(), StubProvider::ok(200.0));

        let series = provider
            .fetch_price_history("bitcoin", HistoryWindow::default())
            .await
            .unwrap();

        let first: Vec<f64> = series.prices().collect();
        assert_eq!(first[0], 200.0);
        assert_eq!(provider.primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_secondary_error_is_reported() {
        let provider = FallbackProvider::new(StubProvider::failing(), StubProvider::failing());

        let result = provider
            .fetch_price_history("bitcoin", HistoryWindow::default())
            .await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().to_string(), "source unavailable");
    }
}
