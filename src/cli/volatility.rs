use super::ui;
use crate::core::atr::{self, DEFAULT_ATR_WINDOW};
use crate::core::market::{HistoryWindow, MarketDataProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::info;

/// Compares ATR-based volatility of the target coin against the reference
/// coin, each normalized by its latest close.
pub async fn run(
    provider: &(dyn MarketDataProvider),
    reference_id: &str,
    coin_id: &str,
    window: HistoryWindow,
) -> Result<()> {
    info!(
        "Calculating volatility multiplier for {} against {}...",
        coin_id, reference_id
    );

    let pb = ui::new_progress_bar(2, false);
    let reference_fut = async {
        let result = provider.fetch_ohlc(reference_id, window).await;
        pb.inc(1);
        result
    };
    let target_fut = async {
        let result = provider.fetch_ohlc(coin_id, window).await;
        pb.inc(1);
        result
    };
    let (reference_ohlc, target_ohlc) = tokio::join!(reference_fut, target_fut);
    pb.finish_and_clear();

    let reference_ohlc =
        reference_ohlc.with_context(|| format!("Failed to fetch OHLC bars for {reference_id}"))?;
    let target_ohlc =
        target_ohlc.with_context(|| format!("Failed to fetch OHLC bars for {coin_id}"))?;

    let reference_pct = atr::atr_percent(&reference_ohlc, DEFAULT_ATR_WINDOW)?;
    let target_pct = atr::atr_percent(&target_ohlc, DEFAULT_ATR_WINDOW)?;
    let multiplier =
        atr::atr_volatility_multiplier(&reference_ohlc, &target_ohlc, DEFAULT_ATR_WINDOW)?;

    println!(
        "\n{} vs {} ({}d window)",
        ui::style_text(coin_id, ui::StyleType::Title),
        reference_id,
        window.num_days()
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Coin"),
        ui::header_cell(&format!("ATR({DEFAULT_ATR_WINDOW})/Close (%)")),
    ]);
    table.add_row(vec![Cell::new(reference_id), ui::metric_cell(reference_pct)]);
    table.add_row(vec![Cell::new(coin_id), ui::metric_cell(target_pct)]);
    println!("{table}");

    println!(
        "\n{} {}",
        ui::style_text("Volatility multiplier:", ui::StyleType::ResultLabel),
        ui::style_text(&format!("{multiplier:.3}x"), ui::StyleType::ResultValue)
    );

    Ok(())
}
