//! Trade orchestration.
//!
//! A trade runs as a short pipeline: validate, pull a rate, compute fees,
//! then commit balance mutations plus audit entries in one store
//! transaction. The rate is always resolved before the transaction opens so
//! the commit window never spans a network call.

use crate::config::TradingConfig;
use crate::core::account::Account;
use crate::core::asset::{Asset, FIAT_CURRENCY};
use crate::core::entry::{EntryKind, EntryMetadata, LedgerEntry};
use crate::core::error::TradeError;
use crate::core::money::{round_crypto, round_fiat};
use crate::fees::FeeCalculator;
use crate::rates::RateProvider;
use crate::store::LedgerStore;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Fiat and asset balance after a committed trade.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NewBalances {
    pub naira: Decimal,
    pub crypto: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuyOutcome {
    pub entry: LedgerEntry,
    pub crypto_amount: Decimal,
    pub rate: Decimal,
    pub fee: Decimal,
    pub new_balances: NewBalances,
}

#[derive(Debug, Clone, Serialize)]
pub struct SellOutcome {
    pub entry: LedgerEntry,
    pub naira_value: Decimal,
    pub rate: Decimal,
    pub fee: Decimal,
    pub credit: Decimal,
    pub new_balances: NewBalances,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepositOutcome {
    pub entry: LedgerEntry,
    pub new_balance: Decimal,
}

pub struct TradeEngine {
    config: TradingConfig,
    rates: Arc<RateProvider>,
    fees: FeeCalculator,
    store: Arc<dyn LedgerStore>,
}

impl TradeEngine {
    pub fn new(
        config: TradingConfig,
        rates: Arc<RateProvider>,
        store: Arc<dyn LedgerStore>,
    ) -> Self {
        let fees = FeeCalculator::new(config.fee_percentage);
        Self {
            config,
            rates,
            fees,
            store,
        }
    }

    /// Create the account with the configured seed balance. Invoked by the
    /// account-creation collaborator, not implicitly on first trade.
    pub async fn provision_account(&self, user_id: &str) -> Result<Account, TradeError> {
        self.store
            .provision_account(user_id, self.config.initial_fiat_balance)
            .await
    }

    /// Buy `asset` for a naira amount. The fee is charged on top, so the
    /// total debit is `fiat_amount + fee`.
    #[instrument(skip(self), fields(asset = %asset, fiat_amount = %fiat_amount))]
    pub async fn buy(
        &self,
        user_id: &str,
        asset: Asset,
        fiat_amount: Decimal,
    ) -> Result<BuyOutcome, TradeError> {
        if fiat_amount <= Decimal::ZERO {
            return Err(TradeError::InvalidAmount);
        }
        if fiat_amount < self.config.min_buy_amount {
            return Err(TradeError::BelowMinimum {
                action: "buy amount",
                minimum: self.config.min_buy_amount,
            });
        }

        let quote = self.rates.get_rate(asset).await;
        let breakdown = self.fees.buy_total(fiat_amount);
        let crypto_amount = round_crypto(fiat_amount / quote.rate);

        let buy_entry = LedgerEntry::new(
            user_id,
            EntryKind::Buy,
            asset.symbol(),
            crypto_amount,
            breakdown.fee,
            Some(quote.rate),
            EntryMetadata::Buy {
                naira_amount: fiat_amount,
                total_debited: breakdown.total,
            },
        );
        let fee_entry = LedgerEntry::fee_for_trade(&buy_entry, asset, "purchase");

        let total = breakdown.total;
        let staged = vec![buy_entry.clone(), fee_entry];
        let committed = self
            .store
            .with_transaction(
                user_id,
                Box::new(move |txn| {
                    txn.debit_fiat(total)?;
                    txn.credit_asset(asset, crypto_amount);
                    for entry in staged {
                        txn.append(entry);
                    }
                    Ok(())
                }),
            )
            .await?;

        info!(
            user_id,
            asset = %asset,
            reference = %buy_entry.reference,
            rate = %quote.rate,
            rate_source = ?quote.source,
            "Buy committed"
        );

        Ok(BuyOutcome {
            crypto_amount,
            rate: quote.rate,
            fee: breakdown.fee,
            new_balances: NewBalances {
                naira: committed.fiat,
                crypto: committed.holding(asset),
            },
            entry: buy_entry,
        })
    }

    /// Sell a crypto amount for naira. The minimum-value floor is checked
    /// against the naira equivalent at the pulled rate, so a rate move
    /// between request and fill can push a previously valid amount under it.
    #[instrument(skip(self), fields(asset = %asset, crypto_amount = %crypto_amount))]
    pub async fn sell(
        &self,
        user_id: &str,
        asset: Asset,
        crypto_amount: Decimal,
    ) -> Result<SellOutcome, TradeError> {
        if crypto_amount <= Decimal::ZERO {
            return Err(TradeError::InvalidAmount);
        }

        // Holdings are checked before the rate pull so an unfunded sell
        // never reaches the upstream; the transaction re-checks under lock.
        let account = self.store.get_account(user_id).await?;
        if account.holding(asset) < crypto_amount {
            return Err(TradeError::InsufficientBalance {
                currency: asset.symbol().to_string(),
            });
        }

        let quote = self.rates.get_rate(asset).await;
        let naira_value = round_fiat(crypto_amount * quote.rate);
        if naira_value < self.config.min_sell_amount {
            return Err(TradeError::BelowMinimum {
                action: "sell value",
                minimum: self.config.min_sell_amount,
            });
        }

        let breakdown = self.fees.sell_credit(naira_value);

        let sell_entry = LedgerEntry::new(
            user_id,
            EntryKind::Sell,
            asset.symbol(),
            crypto_amount,
            breakdown.fee,
            Some(quote.rate),
            EntryMetadata::Sell {
                naira_value,
                credit_received: breakdown.credit,
            },
        );
        let fee_entry = LedgerEntry::fee_for_trade(&sell_entry, asset, "sale");

        let credit = breakdown.credit;
        let staged = vec![sell_entry.clone(), fee_entry];
        let committed = self
            .store
            .with_transaction(
                user_id,
                Box::new(move |txn| {
                    txn.debit_asset(asset, crypto_amount)?;
                    txn.credit_fiat(credit);
                    for entry in staged {
                        txn.append(entry);
                    }
                    Ok(())
                }),
            )
            .await?;

        info!(
            user_id,
            asset = %asset,
            reference = %sell_entry.reference,
            rate = %quote.rate,
            rate_source = ?quote.source,
            "Sell committed"
        );

        Ok(SellOutcome {
            naira_value,
            rate: quote.rate,
            fee: breakdown.fee,
            credit,
            new_balances: NewBalances {
                naira: committed.fiat,
                crypto: committed.holding(asset),
            },
            entry: sell_entry,
        })
    }

    /// Credit naira to an account outside of a trade, e.g. an admin top-up.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn deposit(
        &self,
        user_id: &str,
        amount: Decimal,
    ) -> Result<DepositOutcome, TradeError> {
        if amount <= Decimal::ZERO {
            return Err(TradeError::InvalidAmount);
        }

        let entry = LedgerEntry::new(
            user_id,
            EntryKind::Deposit,
            FIAT_CURRENCY,
            amount,
            Decimal::ZERO,
            None,
            EntryMetadata::Deposit {
                description: "Naira deposit".into(),
            },
        );

        let staged = entry.clone();
        let committed = self
            .store
            .with_transaction(
                user_id,
                Box::new(move |txn| {
                    txn.credit_fiat(amount);
                    txn.append(staged);
                    Ok(())
                }),
            )
            .await?;

        info!(user_id, reference = %entry.reference, "Deposit committed");

        Ok(DepositOutcome {
            entry,
            new_balance: committed.fiat,
        })
    }
}
