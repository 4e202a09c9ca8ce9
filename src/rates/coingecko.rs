//! CoinGecko `simple/price` client.

use super::{PriceSource, QUOTE_CURRENCY};
use crate::core::asset::Asset;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Response shape: `{"bitcoin": {"ngn": 92000000.0}}`.
type SimplePriceResponse = HashMap<String, HashMap<String, Decimal>>;

pub struct CoinGeckoSource {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoSource {
    /// The timeout bounds the whole request; a slow upstream degrades to the
    /// fallback table instead of stalling a trade.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    #[instrument(
        name = "CoinGeckoFetch",
        skip(self),
        fields(asset = %asset)
    )]
    async fn fetch_rate(&self, asset: Asset) -> Result<Decimal> {
        let url = format!("{}/simple/price", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids", asset.coingecko_id()),
                ("vs_currencies", QUOTE_CURRENCY),
            ])
            .send()
            .await
            .context("Price request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Price request returned status {status}");
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .context("Failed to parse price response")?;

        let rate = body
            .get(asset.coingecko_id())
            .and_then(|prices| prices.get(QUOTE_CURRENCY))
            .copied()
            .ok_or_else(|| anyhow!("No {QUOTE_CURRENCY} rate in response for {asset}"))?;

        if rate <= Decimal::ZERO {
            bail!("Upstream returned non-positive rate {rate} for {asset}");
        }

        debug!(rate = %rate, "Fetched live rate");
        Ok(rate)
    }
}
