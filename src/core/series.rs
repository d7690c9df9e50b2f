//! Validated price history types

use crate::core::error::AnalysisError;
use chrono::{DateTime, Utc};

/// A single observed price for one asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// An ordered price history for one asset.
///
/// Invariants, checked at construction: timestamps strictly ascending with
/// no duplicates, every price positive and finite. Instances are immutable
/// once built and live only for the analysis call that consumed them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, AnalysisError> {
        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(AnalysisError::invalid_input(format!(
                    "price at index {i} must be positive and finite, got {}",
                    point.price
                )));
            }
            if i > 0 && point.timestamp <= points[i - 1].timestamp {
                return Err(AnalysisError::invalid_input(format!(
                    "timestamps must be strictly ascending, violated at index {i}"
                )));
            }
        }
        Ok(PriceSeries { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }
}

/// A single daily open/high/low/close bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OhlcBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// An ordered series of OHLC bars, input to the true-range calculations.
///
/// Same ordering invariants as [`PriceSeries`]; additionally every bar must
/// satisfy `high >= low` with all four fields positive and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcSeries {
    bars: Vec<OhlcBar>,
}

impl OhlcSeries {
    pub fn new(bars: Vec<OhlcBar>) -> Result<Self, AnalysisError> {
        for (i, bar) in bars.iter().enumerate() {
            for (field, value) in [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(AnalysisError::invalid_input(format!(
                        "{field} at index {i} must be positive and finite, got {value}"
                    )));
                }
            }
            if bar.high < bar.low {
                return Err(AnalysisError::invalid_input(format!(
                    "bar at index {i} has high {} below low {}",
                    bar.high, bar.low
                )));
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(AnalysisError::invalid_input(format!(
                    "timestamps must be strictly ascending, violated at index {i}"
                )));
            }
        }
        Ok(OhlcSeries { bars })
    }

    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Close prices as a [`PriceSeries`], so a single OHLC fetch can feed
    /// both the beta and the true-range paths.
    pub fn closes(&self) -> Result<PriceSeries, AnalysisError> {
        PriceSeries::new(
            self.bars
                .iter()
                .map(|b| PricePoint {
                    timestamp: b.timestamp,
                    price: b.close,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + day * 86_400, 0).unwrap()
    }

    fn point(day: i64, price: f64) -> PricePoint {
        PricePoint {
            timestamp: ts(day),
            price,
        }
    }

    #[test]
    fn accepts_valid_series() {
        let series =
            PriceSeries::new(vec![point(0, 100.0), point(1, 101.5), point(2, 99.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.last_price(), Some(99.0));
    }

    #[test]
    fn rejects_non_positive_price() {
        let result = PriceSeries::new(vec![point(0, 100.0), point(1, 0.0)]);
        assert!(matches!(
            result,
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_price() {
        let result = PriceSeries::new(vec![point(0, f64::NAN)]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let result = PriceSeries::new(vec![point(0, 100.0), point(0, 101.0)]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let result = PriceSeries::new(vec![point(1, 100.0), point(0, 101.0)]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));
    }

    fn bar(day: i64, low: f64, high: f64, close: f64) -> OhlcBar {
        OhlcBar {
            timestamp: ts(day),
            open: close,
            high,
            low,
            close,
        }
    }

    #[test]
    fn accepts_valid_ohlc_series() {
        let series = OhlcSeries::new(vec![bar(0, 99.0, 101.0, 100.0), bar(1, 98.0, 103.0, 102.0)])
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_close(), Some(102.0));
    }

    #[test]
    fn rejects_inverted_bar_range() {
        let result = OhlcSeries::new(vec![bar(0, 101.0, 99.0, 100.0)]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));
    }

    #[test]
    fn closes_preserve_order() {
        let series = OhlcSeries::new(vec![bar(0, 99.0, 101.0, 100.0), bar(1, 98.0, 103.0, 102.0)])
            .unwrap();
        let closes = series.closes().unwrap();
        let prices: Vec<f64> = closes.prices().collect();
        assert_eq!(prices, vec![100.0, 102.0]);
    }
}
