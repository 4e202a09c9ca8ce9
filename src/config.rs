use anyhow::{Context, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Business limits injected into the trading engine. Immutable once loaded.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TradingConfig {
    /// Fee in percent, charged on every trade.
    #[serde(default = "default_fee_percentage")]
    pub fee_percentage: Decimal,
    /// Smallest naira amount accepted for a buy.
    #[serde(default = "default_min_buy_amount")]
    pub min_buy_amount: Decimal,
    /// Smallest naira value accepted for a sell.
    #[serde(default = "default_min_sell_amount")]
    pub min_sell_amount: Decimal,
    /// Validity window for cached rate quotes.
    #[serde(default = "default_rate_cache_ttl_secs")]
    pub rate_cache_ttl_secs: u64,
    /// Fiat balance seeded when an account is provisioned.
    #[serde(default = "default_initial_fiat_balance")]
    pub initial_fiat_balance: Decimal,
}

fn default_fee_percentage() -> Decimal {
    dec!(1)
}

fn default_min_buy_amount() -> Decimal {
    dec!(5000)
}

fn default_min_sell_amount() -> Decimal {
    dec!(2000)
}

fn default_rate_cache_ttl_secs() -> u64 {
    60
}

fn default_initial_fiat_balance() -> Decimal {
    dec!(100000)
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            fee_percentage: default_fee_percentage(),
            min_buy_amount: default_min_buy_amount(),
            min_sell_amount: default_min_sell_amount(),
            rate_cache_ttl_secs: default_rate_cache_ttl_secs(),
            initial_fiat_balance: default_initial_fiat_balance(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bound on a single upstream price request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "nairex", "nairex")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.trading.fee_percentage, dec!(1));
        assert_eq!(config.trading.min_buy_amount, dec!(5000));
        assert_eq!(config.trading.min_sell_amount, dec!(2000));
        assert_eq!(config.trading.rate_cache_ttl_secs, 60);
        assert_eq!(config.trading.initial_fiat_balance, dec!(100000));
        assert_eq!(config.provider.timeout_secs, 10);
    }

    #[test]
    fn test_config_deserialization_with_partial_file() {
        let yaml_str = r#"
trading:
  fee_percentage: 1.5
  min_buy_amount: 10000
provider:
  base_url: "http://localhost:9000/api/v3"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.trading.fee_percentage, dec!(1.5));
        assert_eq!(config.trading.min_buy_amount, dec!(10000));
        // Unset keys fall back to defaults
        assert_eq!(config.trading.min_sell_amount, dec!(2000));
        assert_eq!(config.provider.base_url, "http://localhost:9000/api/v3");
        assert_eq!(config.provider.timeout_secs, 10);
    }

    #[test]
    fn test_empty_document_uses_all_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.trading.fee_percentage, dec!(1));
        assert_eq!(
            config.provider.base_url,
            "https://api.coingecko.com/api/v3"
        );
    }
}
