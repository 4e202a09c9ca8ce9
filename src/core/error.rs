//! Typed failures surfaced by the trading engine and ledger store.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("An account already exists for user {0}")]
    AccountExists(String),

    #[error("No account found for user {0}")]
    AccountNotFound(String),

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Minimum {action} is \u{20a6}{minimum}")]
    BelowMinimum {
        action: &'static str,
        minimum: Decimal,
    },

    #[error("Insufficient {currency} balance")]
    InsufficientBalance { currency: String },

    #[error("The ledger could not be committed, please retry")]
    StorageConflict,
}

impl TradeError {
    /// Stable machine-checkable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            TradeError::UnsupportedAsset(_) => "unsupported_asset",
            TradeError::AccountExists(_) => "account_exists",
            TradeError::AccountNotFound(_) => "account_not_found",
            TradeError::InvalidAmount => "invalid_amount",
            TradeError::BelowMinimum { .. } => "below_minimum",
            TradeError::InsufficientBalance { .. } => "insufficient_balance",
            TradeError::StorageConflict => "storage_conflict",
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TradeError::StorageConflict)
    }
}
