//! Exchange rate resolution.
//!
//! `RateProvider` answers every rate request, even when the upstream price
//! source is down: quotes come from a TTL cache, then a live fetch, then a
//! static conservative table. Callers never see an upstream failure, only a
//! quote whose `source` records its provenance.

pub mod coingecko;

use crate::core::asset::Asset;
use crate::core::cache::TtlCache;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Quote currency for every rate this provider resolves.
pub const QUOTE_CURRENCY: &str = "ngn";

/// Where a quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Fallback,
}

/// A priced snapshot of one asset in naira. Ephemeral, held only in the
/// cache.
#[derive(Debug, Clone, Serialize)]
pub struct RateQuote {
    pub asset: Asset,
    pub quote_currency: &'static str,
    pub rate: Decimal,
    pub source: RateSource,
    pub valid_until: DateTime<Utc>,
}

/// An upstream that can price an asset in naira. Errors are absorbed by
/// `RateProvider`, never propagated to trading callers.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_rate(&self, asset: Asset) -> Result<Decimal>;
}

/// Conservative static rates used when the upstream is unavailable.
/// Format: 1 unit of the asset in NGN.
fn fallback_rate(asset: Asset) -> Decimal {
    match asset {
        Asset::Btc => dec!(92_000_000),
        Asset::Eth => dec!(5_200_000),
        Asset::Usdt => dec!(1_570),
    }
}

pub struct RateProvider {
    source: Arc<dyn PriceSource>,
    cache: TtlCache<String, RateQuote>,
    ttl: Duration,
}

impl RateProvider {
    pub fn new(source: Arc<dyn PriceSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(),
            ttl,
        }
    }

    /// Resolve a naira quote for one asset.
    ///
    /// Fallback quotes are cached for the full TTL as well, so a failing
    /// upstream is retried once per window rather than once per request.
    pub async fn get_rate(&self, asset: Asset) -> RateQuote {
        let key = cache_key(asset);
        if let Some(quote) = self.cache.get(&key).await {
            return quote;
        }

        let valid_until =
            Utc::now() + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero());
        let quote = match self.source.fetch_rate(asset).await {
            Ok(rate) => RateQuote {
                asset,
                quote_currency: QUOTE_CURRENCY,
                rate,
                source: RateSource::Live,
                valid_until,
            },
            Err(err) => {
                warn!(
                    asset = %asset,
                    error = %err,
                    fallback_rate = %fallback_rate(asset),
                    "Price source unavailable, using fallback rate"
                );
                RateQuote {
                    asset,
                    quote_currency: QUOTE_CURRENCY,
                    rate: fallback_rate(asset),
                    source: RateSource::Fallback,
                    valid_until,
                }
            }
        };

        self.cache.put(key, quote.clone(), self.ttl).await;
        quote
    }

    /// Resolve quotes for several assets concurrently.
    pub async fn get_rates(&self, assets: &[Asset]) -> HashMap<Asset, RateQuote> {
        let quotes = join_all(assets.iter().map(|asset| self.get_rate(*asset))).await;
        assets.iter().copied().zip(quotes).collect()
    }
}

fn cache_key(asset: Asset) -> String {
    format!(
        "rate_{}_{}",
        asset.symbol().to_lowercase(),
        QUOTE_CURRENCY
    )
}
