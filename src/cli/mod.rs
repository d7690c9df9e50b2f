//! Terminal command implementations

pub mod beta;
pub mod coins;
pub mod export;
pub mod ui;
pub mod volatility;
