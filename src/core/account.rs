//! Per-user balance state.

use crate::core::asset::Asset;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// One fiat balance plus one balance per supported asset.
///
/// Created by `LedgerStore::provision_account` and mutated only inside a
/// store transaction; no balance is ever allowed to go negative.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub user_id: String,
    pub fiat: Decimal,
    pub holdings: HashMap<Asset, Decimal>,
}

impl Account {
    /// A freshly provisioned account: seeded fiat, zero for every asset.
    pub fn provisioned(user_id: &str, seed_fiat: Decimal) -> Self {
        Self {
            user_id: user_id.to_string(),
            fiat: seed_fiat,
            holdings: Asset::ALL
                .iter()
                .map(|asset| (*asset, Decimal::ZERO))
                .collect(),
        }
    }

    pub fn holding(&self, asset: Asset) -> Decimal {
        self.holdings.get(&asset).copied().unwrap_or(Decimal::ZERO)
    }
}
