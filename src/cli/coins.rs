use super::ui;
use crate::core::market::{CoinInfo, CoinListProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::info;

/// Lists the coin directory, optionally narrowed by a case-insensitive
/// substring over id, symbol, and name.
pub async fn run(
    provider: &(dyn CoinListProvider),
    search: Option<&str>,
    limit: usize,
) -> Result<()> {
    info!("Fetching coin directory...");

    let coins = provider
        .fetch_coin_list()
        .await
        .context("Failed to fetch coin list")?;

    let matching = filter_coins(&coins, search);
    if matching.is_empty() {
        println!("No coins match the search.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
    ]);
    for coin in matching.iter().take(limit) {
        table.add_row(vec![
            Cell::new(&coin.id),
            Cell::new(&coin.symbol),
            Cell::new(&coin.name),
        ]);
    }
    println!("{table}");

    if matching.len() > limit {
        println!(
            "{}",
            ui::style_text(
                &format!("Showing {} of {} matching coins", limit, matching.len()),
                ui::StyleType::Subtle
            )
        );
    }

    Ok(())
}

fn filter_coins<'a>(coins: &'a [CoinInfo], search: Option<&str>) -> Vec<&'a CoinInfo> {
    match search {
        Some(query) => coins.iter().filter(|c| c.matches(query)).collect(),
        None => coins.iter().collect(),
    }
}
