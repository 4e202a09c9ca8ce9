//! Durable holder of account balances and the append-only ledger.

pub mod memory;

use crate::core::account::Account;
use crate::core::asset::{Asset, FIAT_CURRENCY};
use crate::core::entry::{EntryKind, LedgerEntry};
use crate::core::error::TradeError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Work executed with exclusive access to one account inside a transaction.
/// Synchronous on purpose: no I/O belongs in the commit window.
pub type TxnFn = Box<dyn FnOnce(&mut AccountTxn) -> Result<(), TradeError> + Send>;

/// Staged view of one account during a transaction.
///
/// Mutations apply to a working copy; the store commits the copy and the
/// staged entries together, or discards both.
pub struct AccountTxn {
    account: Account,
    staged: Vec<LedgerEntry>,
}

impl AccountTxn {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            staged: Vec::new(),
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn credit_fiat(&mut self, amount: Decimal) {
        self.account.fiat += amount;
    }

    pub fn debit_fiat(&mut self, amount: Decimal) -> Result<(), TradeError> {
        if self.account.fiat < amount {
            return Err(TradeError::InsufficientBalance {
                currency: FIAT_CURRENCY.to_string(),
            });
        }
        self.account.fiat -= amount;
        Ok(())
    }

    pub fn credit_asset(&mut self, asset: Asset, amount: Decimal) {
        *self.account.holdings.entry(asset).or_default() += amount;
    }

    pub fn debit_asset(&mut self, asset: Asset, amount: Decimal) -> Result<(), TradeError> {
        let balance = self.account.holding(asset);
        if balance < amount {
            return Err(TradeError::InsufficientBalance {
                currency: asset.symbol().to_string(),
            });
        }
        self.account.holdings.insert(asset, balance - amount);
        Ok(())
    }

    pub fn append(&mut self, entry: LedgerEntry) {
        self.staged.push(entry);
    }

    pub(crate) fn into_parts(self) -> (Account, Vec<LedgerEntry>) {
        (self.account, self.staged)
    }
}

/// Query filter for the ledger, newest first.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub kind: Option<EntryKind>,
    pub asset: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

pub const DEFAULT_PER_PAGE: usize = 15;

/// One page of query results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create the account with a seeded fiat balance and a zero balance per
    /// supported asset. Called once by the account-creation collaborator.
    async fn provision_account(
        &self,
        user_id: &str,
        seed_fiat: Decimal,
    ) -> Result<Account, TradeError>;

    /// Point-in-time snapshot for read paths.
    async fn get_account(&self, user_id: &str) -> Result<Account, TradeError>;

    /// Run `work` with exclusive read-modify-write access to the account.
    ///
    /// Either every balance mutation and every appended entry commits, or
    /// none does. A commit that would leave any balance negative aborts the
    /// whole transaction. Returns the committed account snapshot.
    async fn with_transaction(&self, user_id: &str, work: TxnFn) -> Result<Account, TradeError>;

    /// Filtered, paginated ledger history for one account, newest first.
    async fn entries(
        &self,
        user_id: &str,
        filter: &LedgerFilter,
    ) -> Result<Page<LedgerEntry>, TradeError>;
}
