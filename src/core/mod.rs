//! Core domain types and analysis functions

pub mod analysis;
pub mod atr;
pub mod error;
pub mod log;
pub mod market;
pub mod series;

// Re-export main types for cleaner imports
pub use analysis::{BetaResult, MoveProjection};
pub use error::AnalysisError;
pub use market::{CoinInfo, CoinListProvider, HistoryWindow, MarketDataProvider};
pub use series::{OhlcBar, OhlcSeries, PricePoint, PriceSeries};
