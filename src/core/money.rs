//! Fixed-point rounding rules for monetary values.
//!
//! Naira amounts carry 2 fractional digits, crypto balances 8. Everything is
//! `rust_decimal::Decimal`; binary floats would drift across repeated trades.

use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits for naira amounts.
pub const FIAT_DP: u32 = 2;

/// Fractional digits for crypto amounts.
pub const CRYPTO_DP: u32 = 8;

/// Round a naira amount to kobo precision, half away from zero.
pub fn round_fiat(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(FIAT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a crypto amount to 8 decimal places, half away from zero.
pub fn round_crypto(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CRYPTO_DP, RoundingStrategy::MidpointAwayFromZero)
}
