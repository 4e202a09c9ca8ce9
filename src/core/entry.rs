//! Append-only audit records.
//!
//! Every financial event commits exactly one immutable `LedgerEntry`; trades
//! commit two (the trade itself plus a fee entry referencing it). Entries are
//! never updated or deleted.

use crate::core::asset::{Asset, FIAT_CURRENCY};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Buy,
    Sell,
    Fee,
    Deposit,
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntryKind::Buy => "buy",
            EntryKind::Sell => "sell",
            EntryKind::Fee => "fee",
            EntryKind::Deposit => "deposit",
        };
        write!(f, "{label}")
    }
}

impl FromStr for EntryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(EntryKind::Buy),
            "sell" => Ok(EntryKind::Sell),
            "fee" => Ok(EntryKind::Fee),
            "deposit" => Ok(EntryKind::Deposit),
            _ => Err(anyhow::anyhow!("Invalid entry kind: {s}")),
        }
    }
}

/// `Completed` is the only reachable state; there is no pending or reversed
/// lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Completed,
}

/// Context carried by an entry, closed per kind.
///
/// Serialized untagged so the wire shape stays a flat object per kind.
/// Variant order matters: `Fee` must come before `Deposit`, its field set is
/// a superset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryMetadata {
    Buy {
        naira_amount: Decimal,
        total_debited: Decimal,
    },
    Sell {
        naira_value: Decimal,
        credit_received: Decimal,
    },
    Fee {
        parent_reference: String,
        description: String,
    },
    Deposit {
        description: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Idempotency key, `TXN_<timestamp>_<random>`, assigned before
    /// persistence and never reused.
    pub reference: String,
    pub user_id: String,
    pub kind: EntryKind,
    /// Symbol the amount is denominated in: an asset for trades, `NGN` for
    /// fee and deposit entries.
    pub asset: String,
    pub amount: Decimal,
    pub fee: Decimal,
    /// Exchange rate applied at the time; absent for fee and deposit entries.
    pub rate: Option<Decimal>,
    pub status: EntryStatus,
    pub metadata: EntryMetadata,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        user_id: &str,
        kind: EntryKind,
        asset: &str,
        amount: Decimal,
        fee: Decimal,
        rate: Option<Decimal>,
        metadata: EntryMetadata,
    ) -> Self {
        Self {
            reference: generate_reference(),
            user_id: user_id.to_string(),
            kind,
            asset: asset.to_string(),
            amount,
            fee,
            rate,
            status: EntryStatus::Completed,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// The fee entry linked to a trade entry via `parent_reference`.
    pub fn fee_for_trade(trade: &LedgerEntry, asset: Asset, action: &str) -> Self {
        Self::new(
            &trade.user_id,
            EntryKind::Fee,
            FIAT_CURRENCY,
            trade.fee,
            Decimal::ZERO,
            None,
            EntryMetadata::Fee {
                parent_reference: trade.reference.clone(),
                description: format!("Trading fee for {asset} {action}"),
            },
        )
    }
}

fn generate_reference() -> String {
    format!("TXN_{}_{}", Utc::now().timestamp(), Uuid::new_v4().simple())
}
