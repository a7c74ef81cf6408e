//! Ledger state store
//!
//! Plain, single-owner ledger state. All balance bookkeeping lives here; the
//! token registry, transfer engine and topic service extend `LedgerState`
//! from their own modules. Thread-safe sharing is the job of [`crate::Ledger`].

use log::debug;
use std::collections::BTreeMap;

use crate::account::Account;
use crate::config::LedgerConfig;
use crate::entity::{AccountId, Asset, EntityId, EntityKind, TokenId, TopicId};
use crate::error::{LedgerError, LedgerResult};
use crate::token::Token;
use crate::topic::Topic;

#[derive(Debug, Clone)]
pub struct LedgerState {
    config: LedgerConfig,
    // BTreeMap for deterministic iteration order
    pub(crate) accounts: BTreeMap<AccountId, Account>,
    pub(crate) tokens: BTreeMap<TokenId, Token>,
    pub(crate) topics: BTreeMap<TopicId, Topic>,
    next_entity_num: u64,
    /// Fees charged to payers so far
    fees_collected: u64,
    /// HBAR brought into existence by genesis and account creation
    hbar_issued: u128,
}

impl LedgerState {
    pub fn new(config: LedgerConfig) -> Self {
        let next_entity_num = config.first_entity_num;
        Self {
            config,
            accounts: BTreeMap::new(),
            tokens: BTreeMap::new(),
            topics: BTreeMap::new(),
            next_entity_num,
            fees_collected: 0,
            hbar_issued: 0,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn fees_collected(&self) -> u64 {
        self.fees_collected
    }

    pub fn hbar_issued(&self) -> u128 {
        self.hbar_issued
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.values()
    }

    /// Hand out the next entity id (shared by accounts, tokens and topics)
    pub(crate) fn allocate_id(&mut self) -> LedgerResult<EntityId> {
        let num = self.next_entity_num;
        self.next_entity_num = num.checked_add(1).ok_or(LedgerError::Overflow)?;
        Ok(EntityId::from_num(num))
    }

    /// Insert a genesis account with a caller-chosen id
    pub fn insert_genesis_account(&mut self, id: AccountId, balance: u64) -> LedgerResult<()> {
        if self.accounts.contains_key(&id) {
            return Err(LedgerError::InvalidConfig(format!(
                "duplicate genesis account {}",
                id
            )));
        }

        // Keep the allocator ahead of explicitly chosen ids
        let num = id.entity_id().num;
        if num >= self.next_entity_num {
            self.next_entity_num = num.checked_add(1).ok_or(LedgerError::Overflow)?;
        }

        self.accounts.insert(id, Account::new(id, balance));
        self.hbar_issued += u128::from(balance);
        debug!("Genesis account {} funded with {} tinybars", id, balance);
        Ok(())
    }

    /// Allocate a fresh account with the given starting balance
    pub fn create_account(&mut self, initial_hbar: u64) -> LedgerResult<AccountId> {
        let id = AccountId::new(self.allocate_id()?);
        self.accounts.insert(id, Account::new(id, initial_hbar));
        self.hbar_issued += u128::from(initial_hbar);
        debug!("Created account {} with {} tinybars", id, initial_hbar);
        Ok(id)
    }

    pub fn account(&self, id: &AccountId) -> LedgerResult<&Account> {
        self.accounts
            .get(id)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    pub(crate) fn account_mut(&mut self, id: &AccountId) -> LedgerResult<&mut Account> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    pub fn token(&self, id: &TokenId) -> LedgerResult<&Token> {
        self.tokens
            .get(id)
            .ok_or_else(|| LedgerError::token_not_found(id))
    }

    pub(crate) fn token_mut(&mut self, id: &TokenId) -> LedgerResult<&mut Token> {
        self.tokens
            .get_mut(id)
            .ok_or_else(|| LedgerError::token_not_found(id))
    }

    pub fn topic(&self, id: &TopicId) -> LedgerResult<&Topic> {
        self.topics.get(id).ok_or(LedgerError::NotFound {
            kind: EntityKind::Topic,
            id: id.entity_id(),
        })
    }

    pub(crate) fn topic_mut(&mut self, id: &TopicId) -> LedgerResult<&mut Topic> {
        self.topics.get_mut(id).ok_or(LedgerError::NotFound {
            kind: EntityKind::Topic,
            id: id.entity_id(),
        })
    }

    pub fn get_hbar_balance(&self, id: &AccountId) -> LedgerResult<u64> {
        self.account(id).map(Account::hbar_balance)
    }

    /// Add tinybars to an account, returning the new balance
    pub fn credit_hbar(&mut self, id: &AccountId, amount: u64) -> LedgerResult<u64> {
        let account = self.account_mut(id)?;
        let balance = account
            .hbar_balance()
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        account.set_hbar_balance(balance);
        Ok(balance)
    }

    /// Remove tinybars from an account, returning the new balance
    pub fn debit_hbar(&mut self, id: &AccountId, amount: u64) -> LedgerResult<u64> {
        let account = self.account_mut(id)?;
        let have = account.hbar_balance();
        let balance = have
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                account: *id,
                asset: Asset::Hbar,
                need: amount,
                have,
            })?;
        account.set_hbar_balance(balance);
        Ok(balance)
    }

    /// Credit newly issued tinybars (faucet)
    pub fn issue_hbar(&mut self, id: &AccountId, amount: u64) -> LedgerResult<u64> {
        let balance = self.credit_hbar(id, amount)?;
        self.hbar_issued += u128::from(amount);
        Ok(balance)
    }

    /// Debit tinybars and take them out of circulation
    pub fn retire_hbar(&mut self, id: &AccountId, amount: u64) -> LedgerResult<u64> {
        let balance = self.debit_hbar(id, amount)?;
        self.hbar_issued = self.hbar_issued.saturating_sub(u128::from(amount));
        Ok(balance)
    }

    /// Token balance of an account
    ///
    /// Zero when associated but never funded. Fails with `NotAssociated` when the
    /// account is neither associated nor the token's treasury.
    pub fn get_token_balance(&self, account: &AccountId, token: &TokenId) -> LedgerResult<u64> {
        let holder = self.account(account)?;
        let definition = self.token(token)?;

        match holder.token_balance(token) {
            Some(balance) => Ok(balance),
            None if definition.treasury() == account => Ok(0),
            None => Err(LedgerError::NotAssociated {
                account: *account,
                token: *token,
            }),
        }
    }

    pub fn is_associated(&self, account: &AccountId, token: &TokenId) -> LedgerResult<bool> {
        Ok(self.account(account)?.is_associated(token))
    }

    /// Whether `account` may hold `token` (associated or treasury)
    pub(crate) fn may_hold(&self, account: &AccountId, token: &TokenId) -> LedgerResult<bool> {
        let holder = self.account(account)?;
        let definition = self.token(token)?;
        Ok(holder.is_associated(token) || definition.treasury() == account)
    }

    pub(crate) fn collect_fee(&mut self, fee: u64) -> LedgerResult<()> {
        self.fees_collected = self
            .fees_collected
            .checked_add(fee)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Sum of every HBAR balance
    pub fn total_hbar(&self) -> u128 {
        self.accounts
            .values()
            .map(|account| u128::from(account.hbar_balance()))
            .sum()
    }

    /// Sum of every holder's balance of `token`
    pub fn token_holdings(&self, token: &TokenId) -> u128 {
        self.accounts
            .values()
            .filter_map(|account| account.token_balance(token))
            .map(u128::from)
            .sum()
    }
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
