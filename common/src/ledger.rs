//! Shared ledger handle
//!
//! `Ledger` wraps [`LedgerState`] in one `RwLock`. Every operation takes the
//! lock exactly once, so a mutation is a single critical section and readers
//! never observe a half-applied transfer.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::account::Account;
use crate::config::LedgerConfig;
use crate::entity::{AccountId, TokenId, TopicId};
use crate::error::LedgerResult;
use crate::state::LedgerState;
use crate::token::{TokenConfig, TokenSnapshot};
use crate::topic::TopicMessage;
use crate::transfer::{PendingTransfer, TransferReceipt};

/// Cloneable handle to one ledger instance
///
/// # Example
///
/// ```rust
/// use ledger_common::LedgerBuilder;
///
/// let ledger = LedgerBuilder::new()
///     .with_default_balance(1_000)
///     .with_funded_account_count(2)
///     .build()
///     .unwrap();
///
/// let accounts = ledger.account_ids();
/// assert_eq!(accounts.len(), 2);
/// assert_eq!(ledger.get_hbar_balance(&accounts[0]).unwrap(), 1_000);
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self::from_state(LedgerState::new(config))
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Run a read-only closure against the current state
    pub fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.state.read())
    }

    /// Apply several mutations as one unit
    ///
    /// `f` runs against a staged copy of the state under the write lock. The
    /// copy replaces the live state only when `f` returns `Ok`, so an error
    /// anywhere in `f` leaves the ledger exactly as it was.
    pub fn transact<R, E>(
        &self,
        f: impl FnOnce(&mut LedgerState) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut state = self.state.write();
        let mut staged = state.clone();
        let result = f(&mut staged)?;
        *state = staged;
        Ok(result)
    }

    pub fn transaction_fee(&self) -> u64 {
        self.state.read().config().transaction_fee
    }

    pub fn account_ids(&self) -> Vec<AccountId> {
        self.state.read().accounts().map(|a| *a.id()).collect()
    }

    // ===== Ledger state store =====

    pub fn create_account(&self, initial_hbar: u64) -> LedgerResult<AccountId> {
        self.state.write().create_account(initial_hbar)
    }

    pub fn get_hbar_balance(&self, account: &AccountId) -> LedgerResult<u64> {
        self.state.read().get_hbar_balance(account)
    }

    /// Credit newly issued tinybars to `account`
    pub fn credit_hbar(&self, account: &AccountId, amount: u64) -> LedgerResult<u64> {
        self.state.write().issue_hbar(account, amount)
    }

    /// Debit tinybars from `account`, taking them out of circulation
    pub fn debit_hbar(&self, account: &AccountId, amount: u64) -> LedgerResult<u64> {
        self.state.write().retire_hbar(account, amount)
    }

    pub fn get_token_balance(&self, account: &AccountId, token: &TokenId) -> LedgerResult<u64> {
        self.state.read().get_token_balance(account, token)
    }

    pub fn is_associated(&self, account: &AccountId, token: &TokenId) -> LedgerResult<bool> {
        self.state.read().is_associated(account, token)
    }

    // ===== Token registry =====

    pub fn create_token(&self, config: TokenConfig) -> LedgerResult<TokenId> {
        self.state.write().create_token(config)
    }

    pub fn associate(&self, account: &AccountId, token: &TokenId) -> LedgerResult<()> {
        self.state.write().associate(account, token)
    }

    pub fn mint(&self, token: &TokenId, amount: u64) -> LedgerResult<u64> {
        self.state.write().mint(token, amount)
    }

    pub fn get_info(&self, token: &TokenId) -> LedgerResult<TokenSnapshot> {
        self.state.read().get_info(token)
    }

    // ===== Transfer engine =====

    pub fn submit(
        &self,
        pending: &mut PendingTransfer,
        payer: &AccountId,
    ) -> LedgerResult<TransferReceipt> {
        self.state.write().submit_transfer(pending, payer)
    }

    // ===== Topics =====

    pub fn create_topic(
        &self,
        memo: impl Into<String>,
        submit_key: Option<AccountId>,
    ) -> LedgerResult<TopicId> {
        self.state.write().create_topic(memo, submit_key)
    }

    pub fn submit_message(
        &self,
        topic: &TopicId,
        payer: &AccountId,
        signatures: &BTreeSet<AccountId>,
        contents: &str,
    ) -> LedgerResult<TopicMessage> {
        self.state
            .write()
            .submit_message(topic, payer, signatures, contents)
    }

    pub fn topic_messages(
        &self,
        topic: &TopicId,
        from_sequence: u64,
    ) -> LedgerResult<Vec<TopicMessage>> {
        self.state.read().topic_messages(topic, from_sequence)
    }

    /// Consistent copy of balances and token definitions
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            accounts: state.accounts().cloned().collect(),
            tokens: state.tokens().map(|token| token.snapshot()).collect(),
            fees_collected: state.fees_collected(),
            hbar_issued: state.hbar_issued(),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

/// Point-in-time copy of the ledger, used by invariant checkers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub accounts: Vec<Account>,
    pub tokens: Vec<TokenSnapshot>,
    pub fees_collected: u64,
    pub hbar_issued: u128,
}

impl LedgerSnapshot {
    pub fn total_hbar(&self) -> u128 {
        self.accounts
            .iter()
            .map(|account| u128::from(account.hbar_balance()))
            .sum()
    }

    /// Sum of every account's balance of `token`
    pub fn token_holdings(&self, token: &TokenId) -> u128 {
        self.accounts
            .iter()
            .filter_map(|account| account.token_balance(token))
            .map(u128::from)
            .sum()
    }
}

/// Builder for Ledger instances
///
/// # Example
///
/// ```rust
/// use ledger_common::{AccountId, LedgerBuilder};
///
/// let operator = AccountId::from_num(2);
/// let ledger = LedgerBuilder::new()
///     .with_funded_account(operator, 5_000)
///     .with_transaction_fee(10)
///     .build()
///     .unwrap();
/// assert_eq!(ledger.transaction_fee(), 10);
/// ```
pub struct LedgerBuilder {
    config: LedgerConfig,
    funded_accounts: Vec<(Option<AccountId>, u64)>,
    default_balance: u64,
}

impl LedgerBuilder {
    /// Create new builder with defaults
    pub fn new() -> Self {
        Self {
            config: LedgerConfig::default(),
            funded_accounts: Vec::new(),
            default_balance: 100 * crate::config::TINYBARS_PER_HBAR,
        }
    }

    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_transaction_fee(mut self, fee: u64) -> Self {
        self.config.transaction_fee = fee;
        self
    }

    pub fn with_first_entity_num(mut self, num: u64) -> Self {
        self.config.first_entity_num = num;
        self
    }

    /// Add a genesis account with a fixed id
    pub fn with_funded_account(mut self, id: AccountId, balance: u64) -> Self {
        self.funded_accounts.push((Some(id), balance));
        self
    }

    /// Add a genesis account whose id is allocated at build time
    pub fn with_allocated_account(mut self, balance: u64) -> Self {
        self.funded_accounts.push((None, balance));
        self
    }

    /// Replace the genesis accounts by `count` allocated accounts with the
    /// default balance
    pub fn with_funded_account_count(mut self, count: usize) -> Self {
        self.funded_accounts = vec![(None, self.default_balance); count];
        self
    }

    /// Set default balance for funded accounts created by count
    pub fn with_default_balance(mut self, balance: u64) -> Self {
        self.default_balance = balance;
        self
    }

    /// Build the Ledger instance
    ///
    /// Explicit ids are inserted first so allocated ids never collide with them.
    pub fn build(self) -> LedgerResult<Ledger> {
        let mut state = LedgerState::new(self.config);

        for (id, balance) in &self.funded_accounts {
            if let Some(id) = id {
                state.insert_genesis_account(*id, *balance)?;
            }
        }
        for (id, balance) in &self.funded_accounts {
            if id.is_none() {
                state.create_account(*balance)?;
            }
        }

        Ok(Ledger::from_state(state))
    }
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
