//! Account records held by the ledger state store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entity::{AccountId, TokenId};

/// Account state
///
/// The token map doubles as the association set: a token key is present
/// exactly when the account is associated with that token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    /// HBAR balance in tinybars
    hbar_balance: u64,
    token_balances: BTreeMap<TokenId, u64>,
}

impl Account {
    pub fn new(id: AccountId, hbar_balance: u64) -> Self {
        Self {
            id,
            hbar_balance,
            token_balances: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn hbar_balance(&self) -> u64 {
        self.hbar_balance
    }

    pub fn is_associated(&self, token: &TokenId) -> bool {
        self.token_balances.contains_key(token)
    }

    /// Token balance, `None` when not associated
    pub fn token_balance(&self, token: &TokenId) -> Option<u64> {
        self.token_balances.get(token).copied()
    }

    pub fn associations(&self) -> impl Iterator<Item = &TokenId> {
        self.token_balances.keys()
    }

    pub fn token_balances(&self) -> &BTreeMap<TokenId, u64> {
        &self.token_balances
    }

    pub(crate) fn set_hbar_balance(&mut self, balance: u64) {
        self.hbar_balance = balance;
    }

    /// Returns false if the association already existed
    pub(crate) fn associate(&mut self, token: TokenId) -> bool {
        if self.token_balances.contains_key(&token) {
            return false;
        }
        self.token_balances.insert(token, 0);
        true
    }

    pub(crate) fn set_token_balance(&mut self, token: TokenId, balance: u64) {
        self.token_balances.insert(token, balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_starts_at_zero() {
        let mut account = Account::new(AccountId::from_num(1001), 10);
        let token = TokenId::from_num(1002);

        assert!(!account.is_associated(&token));
        assert_eq!(account.token_balance(&token), None);

        assert!(account.associate(token));
        assert!(account.is_associated(&token));
        assert_eq!(account.token_balance(&token), Some(0));

        // Second association is a no-op
        account.set_token_balance(token, 42);
        assert!(!account.associate(token));
        assert_eq!(account.token_balance(&token), Some(42));
    }
}
