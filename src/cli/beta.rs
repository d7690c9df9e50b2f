use super::ui;
use crate::core::analysis;
use crate::core::market::{HistoryWindow, MarketDataProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::info;

/// Fetches price history for the reference coin and the target coin,
/// computes beta and volatility ratio, and optionally projects a
/// hypothetical reference move onto the target.
pub async fn run(
    provider: &(dyn MarketDataProvider),
    reference_id: &str,
    coin_id: &str,
    window: HistoryWindow,
    reference_move: Option<f64>,
) -> Result<()> {
    info!("Calculating beta for {} against {}...", coin_id, reference_id);

    let pb = ui::new_progress_bar(2, false);
    let reference_fut = async {
        let result = provider.fetch_price_history(reference_id, window).await;
        pb.inc(1);
        result
    };
    let target_fut = async {
        let result = provider.fetch_price_history(coin_id, window).await;
        pb.inc(1);
        result
    };
    let (reference_series, target_series) = tokio::join!(reference_fut, target_fut);
    pb.finish_and_clear();

    let reference_series = reference_series
        .with_context(|| format!("Failed to fetch price history for {reference_id}"))?;
    let target_series =
        target_series.with_context(|| format!("Failed to fetch price history for {coin_id}"))?;

    let result = analysis::analyze(&reference_series, &target_series, reference_id, coin_id)?;

    println!(
        "\n{} vs {} ({}d window, {} samples)",
        ui::style_text(coin_id, ui::StyleType::Title),
        reference_id,
        window.num_days(),
        reference_series.len().saturating_sub(1)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    table.add_row(vec![Cell::new("Beta"), ui::metric_cell(result.beta)]);
    table.add_row(vec![
        Cell::new("Volatility ratio"),
        ui::metric_cell(result.volatility_ratio),
    ]);
    println!("{table}");

    if let Some(move_pct) = reference_move {
        let projection = analysis::project(&result, move_pct)?;
        let text = format!(
            "Estimated {} move for a {:+.2}% {} move: {:+.2}%",
            coin_id, projection.input_move_pct, reference_id, projection.projected_move_pct
        );
        let style_type = if projection.projected_move_pct >= 0.0 {
            ui::StyleType::ResultValue
        } else {
            ui::StyleType::Error
        };
        println!("\n{}", ui::style_text(&text, style_type));
    }

    Ok(())
}
