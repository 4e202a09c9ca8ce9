//! In-memory ledger store.
//!
//! One `tokio::sync::Mutex` per account serializes same-account transactions
//! while trades against different accounts proceed fully in parallel. The
//! outer map lock is only held long enough to resolve the account cell,
//! never across an await.

use super::{AccountTxn, DEFAULT_PER_PAGE, LedgerFilter, LedgerStore, Page, TxnFn};
use crate::core::account::Account;
use crate::core::asset::FIAT_CURRENCY;
use crate::core::entry::LedgerEntry;
use crate::core::error::TradeError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::debug;

struct AccountCell {
    account: Account,
    entries: Vec<LedgerEntry>,
}

#[derive(Default)]
pub struct MemoryLedgerStore {
    accounts: RwLock<HashMap<String, Arc<Mutex<AccountCell>>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, user_id: &str) -> Result<Arc<Mutex<AccountCell>>, TradeError> {
        self.accounts
            .read()
            .map_err(|_| TradeError::StorageConflict)?
            .get(user_id)
            .cloned()
            .ok_or_else(|| TradeError::AccountNotFound(user_id.to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn provision_account(
        &self,
        user_id: &str,
        seed_fiat: Decimal,
    ) -> Result<Account, TradeError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| TradeError::StorageConflict)?;
        if accounts.contains_key(user_id) {
            return Err(TradeError::AccountExists(user_id.to_string()));
        }

        let account = Account::provisioned(user_id, seed_fiat);
        accounts.insert(
            user_id.to_string(),
            Arc::new(Mutex::new(AccountCell {
                account: account.clone(),
                entries: Vec::new(),
            })),
        );
        debug!(user_id, seed_fiat = %seed_fiat, "Provisioned account");
        Ok(account)
    }

    async fn get_account(&self, user_id: &str) -> Result<Account, TradeError> {
        let cell = self.cell(user_id)?;
        let guard = cell.lock().await;
        Ok(guard.account.clone())
    }

    async fn with_transaction(&self, user_id: &str, work: TxnFn) -> Result<Account, TradeError> {
        let cell = self.cell(user_id)?;
        let mut guard = cell.lock().await;

        let mut txn = AccountTxn::new(guard.account.clone());
        work(&mut txn)?;

        let (account, staged) = txn.into_parts();
        verify_non_negative(&account)?;

        guard.account = account.clone();
        guard.entries.extend(staged);
        Ok(account)
    }

    async fn entries(
        &self,
        user_id: &str,
        filter: &LedgerFilter,
    ) -> Result<Page<LedgerEntry>, TradeError> {
        let cell = self.cell(user_id)?;
        let guard = cell.lock().await;

        let asset_filter = filter.asset.as_ref().map(|a| a.to_uppercase());
        let matching: Vec<&LedgerEntry> = guard
            .entries
            .iter()
            .rev()
            .filter(|entry| filter.kind.is_none_or(|kind| entry.kind == kind))
            .filter(|entry| {
                asset_filter
                    .as_ref()
                    .is_none_or(|asset| &entry.asset == asset)
            })
            .collect();

        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();

        Ok(Page {
            items,
            page,
            per_page,
            total,
        })
    }
}

fn verify_non_negative(account: &Account) -> Result<(), TradeError> {
    if account.fiat < Decimal::ZERO {
        return Err(TradeError::InsufficientBalance {
            currency: FIAT_CURRENCY.to_string(),
        });
    }
    for (asset, balance) in &account.holdings {
        if *balance < Decimal::ZERO {
            return Err(TradeError::InsufficientBalance {
                currency: asset.symbol().to_string(),
            });
        }
    }
    Ok(())
}
