//! Average-true-range volatility, matching the ATR(n)/close convention
//! used by charting platforms.

use crate::core::error::AnalysisError;
use crate::core::series::{OhlcBar, OhlcSeries};

pub const DEFAULT_ATR_WINDOW: usize = 14;

/// True range of one bar given the previous bar's close: the largest of
/// the bar's own range and the gaps from the previous close.
pub fn true_range(bar: &OhlcBar, prev_close: f64) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

/// Simple moving average of true range over the trailing `window` bars.
///
/// Needs `window + 1` bars, since the oldest bar in the window still
/// requires a previous close.
pub fn average_true_range(series: &OhlcSeries, window: usize) -> Result<f64, AnalysisError> {
    if window == 0 {
        return Err(AnalysisError::invalid_input(
            "true range window must cover at least one bar",
        ));
    }
    let bars = series.bars();
    if bars.len() < window + 1 {
        return Err(AnalysisError::InsufficientData {
            required: window + 1,
            got: bars.len(),
        });
    }

    let start = bars.len() - window;
    let sum: f64 = (start..bars.len())
        .map(|i| true_range(&bars[i], bars[i - 1].close))
        .sum();
    Ok(sum / window as f64)
}

/// Relative volatility of a target asset against a reference asset, each
/// measured as ATR over the last close in percent.
///
/// A reference asset whose ATR percentage is zero (prices never moved over
/// the window) has no defined multiplier and fails rather than returning
/// infinity.
pub fn atr_volatility_multiplier(
    reference: &OhlcSeries,
    target: &OhlcSeries,
    window: usize,
) -> Result<f64, AnalysisError> {
    let reference_pct = atr_percent(reference, window)?;
    let target_pct = atr_percent(target, window)?;

    if reference_pct == 0.0 {
        return Err(AnalysisError::ZeroVariance);
    }
    Ok(target_pct / reference_pct)
}

/// ATR normalized by the latest close, in percent.
pub fn atr_percent(series: &OhlcSeries, window: usize) -> Result<f64, AnalysisError> {
    let atr = average_true_range(series, window)?;
    // A validated non-empty series always has a last close.
    let last_close = series
        .last_close()
        .ok_or_else(|| AnalysisError::invalid_input("series has no bars"))?;
    Ok(atr / last_close * 100.0)
}
