//! Percentage fee calculation.
//!
//! Buy: the fee is added on top of the naira amount. Sell: the fee is
//! deducted from the naira proceeds. Fees always settle in naira, rounded to
//! kobo precision.

use crate::core::money::round_fiat;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyTotal {
    pub amount: Decimal,
    pub fee: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellCredit {
    pub amount: Decimal,
    pub fee: Decimal,
    pub credit: Decimal,
}

/// Pure and deterministic; holds the configured fee percentage.
#[derive(Debug, Clone, Copy)]
pub struct FeeCalculator {
    fee_percentage: Decimal,
}

impl FeeCalculator {
    /// `fee_percentage` is in percent, e.g. `1` for a 1% fee.
    pub fn new(fee_percentage: Decimal) -> Self {
        Self { fee_percentage }
    }

    pub fn fee_percentage(&self) -> Decimal {
        self.fee_percentage
    }

    pub fn fee_for(&self, amount: Decimal) -> Decimal {
        round_fiat(amount * self.fee_percentage / Decimal::ONE_HUNDRED)
    }

    /// Total naira debit for a buy: amount plus fee.
    pub fn buy_total(&self, amount: Decimal) -> BuyTotal {
        let fee = self.fee_for(amount);
        BuyTotal {
            amount,
            fee,
            total: amount + fee,
        }
    }

    /// Naira credit for a sell: value minus fee.
    pub fn sell_credit(&self, value: Decimal) -> SellCredit {
        let fee = self.fee_for(value);
        SellCredit {
            amount: value,
            fee,
            credit: value - fee,
        }
    }
}
