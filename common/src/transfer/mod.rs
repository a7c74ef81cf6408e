//! Multi-party HBAR and token transfers
//!
//! A transfer is built from signed entries, collects signatures while in
//! [`TransferStatus::Built`] and is applied exactly once by
//! [`LedgerState::submit_transfer`](crate::LedgerState::submit_transfer).
//!
//! ```rust
//! use ledger_common::{AccountId, TransferBuilder};
//!
//! let alice = AccountId::from_num(1001);
//! let bob = AccountId::from_num(1002);
//!
//! let transfer = TransferBuilder::new()
//!     .hbar(alice, -100)
//!     .hbar(bob, 100)
//!     .build()
//!     .unwrap();
//! assert!(transfer.required_signers().contains(&alice));
//! ```

mod engine;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::{AsRefStr, Display};

use crate::entity::{AccountId, Asset, TokenId};
use crate::error::{LedgerError, LedgerResult};

/// One leg of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEntry {
    pub account: AccountId,
    pub asset: Asset,
    /// Negative for debits, positive for credits
    pub delta: i64,
}

impl TransferEntry {
    pub fn hbar(account: AccountId, delta: i64) -> Self {
        Self {
            account,
            asset: Asset::Hbar,
            delta,
        }
    }

    pub fn token(token: TokenId, account: AccountId, delta: i64) -> Self {
        Self {
            account,
            asset: Asset::Token(token),
            delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransferStatus {
    Built,
    Submitted,
    Rejected,
}

/// A balanced transfer that has not been applied yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    entries: Vec<TransferEntry>,
    signatures: BTreeSet<AccountId>,
    status: TransferStatus,
}

impl PendingTransfer {
    /// Validate entries and build a pending transfer
    ///
    /// Every asset's deltas must sum to exactly zero. Ledger state is not
    /// consulted; existence and association are checked at submission.
    pub fn build(entries: Vec<TransferEntry>) -> LedgerResult<Self> {
        if entries.is_empty() {
            return Err(LedgerError::InvalidAmount(
                "transfer needs at least one entry".into(),
            ));
        }

        let mut sums: BTreeMap<Asset, i128> = BTreeMap::new();
        for entry in &entries {
            if entry.delta == 0 {
                return Err(LedgerError::InvalidAmount(format!(
                    "zero delta for {} on {}",
                    entry.asset, entry.account
                )));
            }
            *sums.entry(entry.asset).or_default() += i128::from(entry.delta);
        }

        if let Some((asset, sum)) = sums.into_iter().find(|(_, sum)| *sum != 0) {
            return Err(LedgerError::Unbalanced { asset, sum });
        }

        Ok(Self {
            entries,
            signatures: BTreeSet::new(),
            status: TransferStatus::Built,
        })
    }

    pub fn entries(&self) -> &[TransferEntry] {
        &self.entries
    }

    pub fn signatures(&self) -> &BTreeSet<AccountId> {
        &self.signatures
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    /// Accounts that must sign: every account with a negative entry
    pub fn required_signers(&self) -> BTreeSet<AccountId> {
        self.entries
            .iter()
            .filter(|entry| entry.delta < 0)
            .map(|entry| entry.account)
            .collect()
    }

    /// Required signers not covered by the collected signatures or the payer
    pub fn missing_signers(&self, payer: &AccountId) -> Vec<AccountId> {
        self.required_signers()
            .into_iter()
            .filter(|signer| signer != payer && !self.signatures.contains(signer))
            .collect()
    }

    /// Add a signature; only allowed before submission
    pub fn sign(&mut self, account: AccountId) -> LedgerResult<()> {
        self.ensure_built()?;
        self.signatures.insert(account);
        Ok(())
    }

    /// Net delta per (account, asset), merging duplicate legs
    pub fn net_deltas(&self) -> BTreeMap<(AccountId, Asset), i128> {
        let mut deltas = BTreeMap::new();
        for entry in &self.entries {
            *deltas.entry((entry.account, entry.asset)).or_default() += i128::from(entry.delta);
        }
        deltas
    }

    fn ensure_built(&self) -> LedgerResult<()> {
        match self.status {
            TransferStatus::Built => Ok(()),
            status => Err(LedgerError::TransferFinalized { status }),
        }
    }

    pub(crate) fn finalize(&mut self, status: TransferStatus) {
        self.status = status;
    }
}

/// Free-function form of [`PendingTransfer::build`]
pub fn build_transfer(entries: Vec<TransferEntry>) -> LedgerResult<PendingTransfer> {
    PendingTransfer::build(entries)
}

/// Free-function form of [`PendingTransfer::required_signers`]
pub fn required_signers(transfer: &PendingTransfer) -> BTreeSet<AccountId> {
    transfer.required_signers()
}

/// Fluent builder for transfers
///
/// ```rust
/// use ledger_common::{AccountId, TokenId, TransferBuilder};
///
/// let token = TokenId::from_num(1003);
/// let result = TransferBuilder::new()
///     .token(token, AccountId::from_num(1001), -10)
///     .token(token, AccountId::from_num(1002), 9)
///     .build();
/// assert!(result.is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransferBuilder {
    entries: Vec<TransferEntry>,
}

impl TransferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hbar(self, account: AccountId, delta: i64) -> Self {
        self.entry(TransferEntry::hbar(account, delta))
    }

    pub fn token(self, token: TokenId, account: AccountId, delta: i64) -> Self {
        self.entry(TransferEntry::token(token, account, delta))
    }

    pub fn entry(mut self, entry: TransferEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> LedgerResult<PendingTransfer> {
        PendingTransfer::build(self.entries)
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub payer: AccountId,
    pub fee_charged: u64,
    pub entries: Vec<TransferEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn account(num: u64) -> AccountId {
        AccountId::from_num(num)
    }

    #[test]
    fn test_unbalanced_hbar_is_rejected() {
        let err = TransferBuilder::new()
            .hbar(account(1), -100)
            .hbar(account(2), 60)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Unbalanced {
                asset: Asset::Hbar,
                sum: -40
            }
        );
    }

    #[test]
    fn test_each_asset_balances_independently() {
        let token = TokenId::from_num(10);
        // HBAR balances, token does not
        let err = TransferBuilder::new()
            .hbar(account(1), -5)
            .hbar(account(2), 5)
            .token(token, account(2), -3)
            .token(token, account(1), 2)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unbalanced);

        let transfer = TransferBuilder::new()
            .hbar(account(1), -5)
            .hbar(account(2), 5)
            .token(token, account(2), -3)
            .token(token, account(1), 3)
            .build()
            .unwrap();
        assert_eq!(transfer.status(), TransferStatus::Built);
        assert_eq!(transfer.entries().len(), 4);
    }

    #[test]
    fn test_empty_and_zero_entries_are_invalid() {
        assert_eq!(
            build_transfer(Vec::new()).unwrap_err().kind(),
            ErrorKind::InvalidAmount
        );
        assert_eq!(
            TransferBuilder::new()
                .hbar(account(1), 0)
                .build()
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidAmount
        );
    }

    #[test]
    fn test_required_signers_are_debited_accounts() {
        let token = TokenId::from_num(10);
        let transfer = TransferBuilder::new()
            .token(token, account(1), -10)
            .token(token, account(2), -10)
            .token(token, account(3), 20)
            .build()
            .unwrap();

        let signers = required_signers(&transfer);
        assert_eq!(signers.len(), 2);
        assert!(signers.contains(&account(1)));
        assert!(signers.contains(&account(2)));
        assert!(!signers.contains(&account(3)));

        // The payer signs implicitly
        assert_eq!(transfer.missing_signers(&account(1)), vec![account(2)]);
    }

    #[test]
    fn test_signing_after_finalization_fails() {
        let mut transfer = TransferBuilder::new()
            .hbar(account(1), -1)
            .hbar(account(2), 1)
            .build()
            .unwrap();
        transfer.sign(account(1)).unwrap();
        transfer.finalize(TransferStatus::Rejected);

        let err = transfer.sign(account(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferFinalized);
        assert_eq!(err.to_string(), "Transfer is already rejected");
    }

    #[test]
    fn test_net_deltas_merge_duplicate_legs() {
        let transfer = TransferBuilder::new()
            .hbar(account(1), -10)
            .hbar(account(1), -5)
            .hbar(account(2), 15)
            .build()
            .unwrap();
        let deltas = transfer.net_deltas();
        assert_eq!(deltas[&(account(1), Asset::Hbar)], -15);
        assert_eq!(deltas[&(account(2), Asset::Hbar)], 15);
    }
}
