use super::ui;
use crate::core::analysis::{self, BetaResult};
use crate::core::market::{HistoryWindow, MarketDataProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;
use futures::future::join_all;
use std::path::Path;
use tracing::{info, warn};

#[derive(Clone)]
struct ExportRow {
    coin_id: String,
    result: Option<BetaResult>,
    error: Option<String>,
}

/// Runs the beta analysis for every watchlist coin against the reference
/// and writes the successful results to a CSV file.
pub async fn run(
    provider: &(dyn MarketDataProvider),
    reference_id: &str,
    watchlist: &[String],
    window: HistoryWindow,
    output: &Path,
    limit: usize,
) -> Result<()> {
    if watchlist.is_empty() {
        println!("No coins in watchlist to export. Add some via the config file.");
        return Ok(());
    }

    let coins = &watchlist[..watchlist.len().min(limit)];
    if coins.len() < watchlist.len() {
        // The public APIs rate-limit aggressive batches.
        warn!(
            "Watchlist has {} coins, exporting the first {}",
            watchlist.len(),
            coins.len()
        );
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Watchlist has {} coins; exporting the first {} (raise --limit to include more)",
                    watchlist.len(),
                    coins.len()
                ),
                ui::StyleType::Subtle
            )
        );
    }

    info!("Exporting beta for {} coins...", coins.len());

    let reference_series = provider
        .fetch_price_history(reference_id, window)
        .await
        .with_context(|| format!("Failed to fetch price history for {reference_id}"))?;

    let pb = ui::new_progress_bar(coins.len() as u64, false);
    let futures = coins.iter().map(|coin_id| {
        let pb_clone = pb.clone();
        let reference_series = &reference_series;
        async move {
            let row = match provider.fetch_price_history(coin_id, window).await {
                Ok(target_series) => {
                    match analysis::analyze(reference_series, &target_series, reference_id, coin_id)
                    {
                        Ok(result) => ExportRow {
                            coin_id: coin_id.clone(),
                            result: Some(result),
                            error: None,
                        },
                        Err(e) => ExportRow {
                            coin_id: coin_id.clone(),
                            result: None,
                            error: Some(e.to_string()),
                        },
                    }
                }
                Err(e) => ExportRow {
                    coin_id: coin_id.clone(),
                    result: None,
                    error: Some(e.to_string()),
                },
            };
            pb_clone.inc(1);
            row
        }
    });

    let rows: Vec<ExportRow> = join_all(futures).await;
    pb.finish_and_clear();

    for row in &rows {
        if let Some(e) = &row.error {
            warn!("Skipping {} in export: {}", row.coin_id, e);
        }
    }

    let exported = rows.iter().filter(|r| r.result.is_some()).count();
    if exported == 0 {
        anyhow::bail!("No coin could be analyzed; nothing to export");
    }

    let csv = render_csv(&rows);
    std::fs::write(output, csv)
        .with_context(|| format!("Failed to write CSV file to {}", output.display()))?;

    display_rows(&rows, reference_id);
    println!(
        "\n{} {}",
        ui::style_text(
            &format!("Exported {exported} coins to"),
            ui::StyleType::ResultLabel
        ),
        ui::style_text(&output.display().to_string(), ui::StyleType::ResultValue)
    );

    Ok(())
}

// Failed coins are logged and left out of the file rather than written
// with placeholder values.
fn render_csv(rows: &[ExportRow]) -> String {
    let mut csv = String::from("coin,beta,volatility_ratio\n");
    for row in rows {
        if let Some(result) = &row.result {
            csv.push_str(&format!(
                "{},{:.6},{:.6}\n",
                row.coin_id, result.beta, result.volatility_ratio
            ));
        }
    }
    csv
}

fn display_rows(rows: &[ExportRow], reference_id: &str) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Coin"),
        ui::header_cell(&format!("Beta vs {reference_id}")),
        ui::header_cell("Volatility ratio"),
    ]);

    for row in rows {
        let (beta_cell, ratio_cell) = match &row.result {
            Some(result) => (
                ui::metric_cell(result.beta),
                ui::metric_cell(result.volatility_ratio),
            ),
            None => (ui::na_cell(true), ui::na_cell(true)),
        };
        table.add_row(vec![Cell::new(&row.coin_id), beta_cell, ratio_cell]);
    }

    println!("{table}");
}
