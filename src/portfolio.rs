//! Read-only valuation of an account's balances.

use crate::cli::ui;
use crate::core::account::Account;
use crate::core::asset::{Asset, FIAT_CURRENCY};
use crate::core::error::TradeError;
use crate::core::money::round_fiat;
use crate::rates::RateProvider;
use crate::store::LedgerStore;
use comfy_table::Cell;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct FiatPosition {
    pub balance: Decimal,
    pub currency: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CryptoPosition {
    pub balance: Decimal,
    pub naira_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub fiat: FiatPosition,
    pub crypto: BTreeMap<Asset, CryptoPosition>,
}

impl Portfolio {
    pub fn total_naira_value(&self) -> Decimal {
        self.fiat.balance
            + self
                .crypto
                .values()
                .map(|position| position.naira_value)
                .sum::<Decimal>()
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell("Balance"),
            ui::header_cell("Value (NGN)"),
        ]);

        table.add_row(vec![
            Cell::new(self.fiat.currency),
            ui::amount_cell(&format!("{:.2}", self.fiat.balance)),
            ui::amount_cell(&format!("{:.2}", self.fiat.balance)),
        ]);
        for (asset, position) in &self.crypto {
            table.add_row(vec![
                Cell::new(asset.symbol()),
                ui::amount_cell(&format!("{:.8}", position.balance)),
                ui::amount_cell(&format!("{:.2}", position.naira_value)),
            ]);
        }

        format!(
            "{table}\n\nTotal Value (NGN): {:.2}",
            self.total_naira_value()
        )
    }
}

/// Composes account snapshots with batched rate quotes. No mutation, no
/// invariant beyond consistent display rounding.
pub struct PortfolioView {
    rates: Arc<RateProvider>,
    store: Arc<dyn LedgerStore>,
}

impl PortfolioView {
    pub fn new(rates: Arc<RateProvider>, store: Arc<dyn LedgerStore>) -> Self {
        Self { rates, store }
    }

    pub async fn get_portfolio(&self, user_id: &str) -> Result<Portfolio, TradeError> {
        let account = self.store.get_account(user_id).await?;
        let quotes = self.rates.get_rates(&Asset::ALL).await;

        let crypto = Asset::ALL
            .iter()
            .map(|asset| {
                let balance = account.holding(*asset);
                let rate = quotes
                    .get(asset)
                    .map(|quote| quote.rate)
                    .unwrap_or(Decimal::ZERO);
                (
                    *asset,
                    CryptoPosition {
                        balance,
                        naira_value: round_fiat(balance * rate),
                    },
                )
            })
            .collect();

        Ok(Portfolio {
            fiat: fiat_position(&account),
            crypto,
        })
    }
}

fn fiat_position(account: &Account) -> FiatPosition {
    FiatPosition {
        balance: account.fiat,
        currency: FIAT_CURRENCY,
    }
}
