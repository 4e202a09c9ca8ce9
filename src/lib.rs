pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod fees;
pub mod log;
pub mod portfolio;
pub mod rates;
pub mod store;

use crate::config::AppConfig;
use crate::core::asset::Asset;
use crate::engine::TradeEngine;
use crate::portfolio::PortfolioView;
use crate::rates::{RateProvider, coingecko::CoinGeckoSource};
use crate::store::memory::MemoryLedgerStore;
use crate::store::{LedgerFilter, LedgerStore};
use anyhow::Result;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Fully wired application: engine, valuation view, and their shared
/// collaborators.
pub struct App {
    pub engine: TradeEngine,
    pub portfolio: PortfolioView,
    pub rates: Arc<RateProvider>,
    pub store: Arc<dyn LedgerStore>,
}

impl App {
    pub fn build(config: &AppConfig) -> Result<Self> {
        let source = CoinGeckoSource::new(
            &config.provider.base_url,
            Duration::from_secs(config.provider.timeout_secs),
        )?;
        let rates = Arc::new(RateProvider::new(
            Arc::new(source),
            Duration::from_secs(config.trading.rate_cache_ttl_secs),
        ));
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());

        Ok(Self {
            engine: TradeEngine::new(
                config.trading.clone(),
                Arc::clone(&rates),
                Arc::clone(&store),
            ),
            portfolio: PortfolioView::new(Arc::clone(&rates), Arc::clone(&store)),
            rates,
            store,
        })
    }
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    }
}

/// Print current quotes for every supported asset, with provenance.
pub async fn run_rates(config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let app = App::build(&config)?;

    let quotes = app.rates.get_rates(&Asset::ALL).await;
    let mut table = cli::ui::new_styled_table();
    table.set_header(vec![
        cli::ui::header_cell("Asset"),
        cli::ui::header_cell("Rate (NGN)"),
        cli::ui::header_cell("Source"),
    ]);
    for asset in Asset::ALL {
        let quote = &quotes[&asset];
        table.add_row(vec![
            comfy_table::Cell::new(asset.symbol()),
            cli::ui::amount_cell(&quote.rate.to_string()),
            comfy_table::Cell::new(format!("{:?}", quote.source).to_lowercase()),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Scripted trading session against a fresh in-memory ledger. Exercises
/// provisioning, a buy, a sell, the portfolio view, and the ledger query.
pub async fn run_demo(user_id: &str, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let app = App::build(&config)?;

    info!(user_id, "Provisioning demo account");
    app.engine.provision_account(user_id).await?;

    let buy = app.engine.buy(user_id, Asset::Btc, dec!(50000)).await?;
    println!(
        "Bought {} BTC at rate {} (fee \u{20a6}{}, reference {})",
        buy.crypto_amount, buy.rate, buy.fee, buy.entry.reference
    );

    let half = crate::core::money::round_crypto(buy.crypto_amount / dec!(2));
    let sell = app.engine.sell(user_id, Asset::Btc, half).await?;
    println!(
        "Sold {} BTC for \u{20a6}{} (credit \u{20a6}{}, reference {})",
        half, sell.naira_value, sell.credit, sell.entry.reference
    );

    let portfolio = app.portfolio.get_portfolio(user_id).await?;
    println!("\n{}", portfolio.display_as_table());

    let page = app.store.entries(user_id, &LedgerFilter::default()).await?;
    println!("\n{}", cli::ledger_table(&page));
    Ok(())
}
