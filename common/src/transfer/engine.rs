//! Transfer engine
//!
//! Validates a pending transfer against the ledger state and applies it as one
//! unit. Checks run in a fixed order: transfer status, entity existence,
//! signatures, associations, then resulting balances (fee included). Nothing
//! is written until every check has passed.

use log::{debug, warn};
use std::collections::BTreeMap;

use crate::entity::{AccountId, Asset};
use crate::error::{LedgerError, LedgerResult};
use crate::state::LedgerState;

use super::{PendingTransfer, TransferReceipt, TransferStatus};

impl LedgerState {
    /// Submit a pending transfer paid for by `payer`
    ///
    /// The payer signs implicitly and is charged the configured transaction
    /// fee. On any failure the transfer becomes `Rejected` and the ledger is
    /// unchanged; on success it becomes `Submitted`.
    pub fn submit_transfer(
        &mut self,
        pending: &mut PendingTransfer,
        payer: &AccountId,
    ) -> LedgerResult<TransferReceipt> {
        if pending.status() != TransferStatus::Built {
            return Err(LedgerError::TransferFinalized {
                status: pending.status(),
            });
        }

        match self.apply_transfer(pending, payer) {
            Ok(receipt) => {
                pending.finalize(TransferStatus::Submitted);
                Ok(receipt)
            }
            Err(e) => {
                warn!("Transfer paid by {} rejected: {}", payer, e);
                pending.finalize(TransferStatus::Rejected);
                Err(e)
            }
        }
    }

    fn apply_transfer(
        &mut self,
        pending: &PendingTransfer,
        payer: &AccountId,
    ) -> LedgerResult<TransferReceipt> {
        self.account(payer)?;
        for entry in pending.entries() {
            self.account(&entry.account)?;
            if let Some(token) = entry.asset.token() {
                self.token(token)?;
            }
        }

        if let Some(signer) = pending.missing_signers(payer).into_iter().next() {
            return Err(LedgerError::MissingSignature(signer));
        }

        for entry in pending.entries() {
            if let Some(token) = entry.asset.token() {
                if !self.may_hold(&entry.account, token)? {
                    return Err(LedgerError::NotAssociated {
                        account: entry.account,
                        token: *token,
                    });
                }
            }
        }

        let fee = self.config().transaction_fee;
        let mut deltas = pending.net_deltas();
        *deltas.entry((*payer, Asset::Hbar)).or_default() -= i128::from(fee);

        let staged = self.stage_balances(&deltas)?;

        // Commit
        for ((account, asset), balance) in staged {
            let holder = self.account_mut(&account)?;
            match asset {
                Asset::Hbar => holder.set_hbar_balance(balance),
                Asset::Token(token) => holder.set_token_balance(token, balance),
            }
        }
        self.collect_fee(fee)?;

        debug!(
            "Applied transfer of {} entries, fee {} paid by {}",
            pending.entries().len(),
            fee,
            payer
        );

        Ok(TransferReceipt {
            payer: *payer,
            fee_charged: fee,
            entries: pending.entries().to_vec(),
        })
    }

    /// Compute every resulting balance without writing any of them
    fn stage_balances(
        &self,
        deltas: &BTreeMap<(AccountId, Asset), i128>,
    ) -> LedgerResult<Vec<((AccountId, Asset), u64)>> {
        let mut staged = Vec::with_capacity(deltas.len());
        for (&(account, asset), &delta) in deltas {
            let current = match &asset {
                Asset::Hbar => self.get_hbar_balance(&account)?,
                Asset::Token(token) => self.get_token_balance(&account, token)?,
            };

            let next = i128::from(current) + delta;
            if next < 0 {
                return Err(LedgerError::InsufficientFunds {
                    account,
                    asset,
                    need: u64::try_from(-delta).map_err(|_| LedgerError::Overflow)?,
                    have: current,
                });
            }
            let next = u64::try_from(next).map_err(|_| LedgerError::Overflow)?;
            staged.push(((account, asset), next));
        }

        // Fee counter must not overflow during commit
        let fee = self.config().transaction_fee;
        self.fees_collected()
            .checked_add(fee)
            .ok_or(LedgerError::Overflow)?;

        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::error::ErrorKind;
    use crate::token::TokenConfig;
    use crate::transfer::TransferBuilder;

    const FEE: u64 = 10;

    fn state() -> LedgerState {
        LedgerState::new(LedgerConfig {
            transaction_fee: FEE,
            ..LedgerConfig::default()
        })
    }

    #[test]
    fn test_hbar_transfer_applies_and_charges_fee() {
        let mut state = state();
        let alice = state.create_account(1_000).unwrap();
        let bob = state.create_account(0).unwrap();

        let mut transfer = TransferBuilder::new()
            .hbar(alice, -300)
            .hbar(bob, 300)
            .build()
            .unwrap();
        let receipt = state.submit_transfer(&mut transfer, &alice).unwrap();

        assert_eq!(receipt.fee_charged, FEE);
        assert_eq!(transfer.status(), TransferStatus::Submitted);
        assert_eq!(state.get_hbar_balance(&alice).unwrap(), 1_000 - 300 - FEE);
        assert_eq!(state.get_hbar_balance(&bob).unwrap(), 300);
        assert_eq!(state.fees_collected(), FEE);
        assert_eq!(
            state.total_hbar() + u128::from(state.fees_collected()),
            state.hbar_issued()
        );
    }

    #[test]
    fn test_missing_signature_leaves_balances_unchanged() {
        let mut state = state();
        let payer = state.create_account(1_000).unwrap();
        let sender = state.create_account(1_000).unwrap();
        let receiver = state.create_account(0).unwrap();

        let mut transfer = TransferBuilder::new()
            .hbar(sender, -100)
            .hbar(receiver, 100)
            .build()
            .unwrap();
        let err = state.submit_transfer(&mut transfer, &payer).unwrap_err();

        assert_eq!(err, LedgerError::MissingSignature(sender));
        assert_eq!(transfer.status(), TransferStatus::Rejected);
        assert_eq!(state.get_hbar_balance(&sender).unwrap(), 1_000);
        assert_eq!(state.get_hbar_balance(&receiver).unwrap(), 0);
        assert_eq!(state.get_hbar_balance(&payer).unwrap(), 1_000);
        assert_eq!(state.fees_collected(), 0);
    }

    #[test]
    fn test_signed_transfer_with_separate_payer() {
        let mut state = state();
        let payer = state.create_account(1_000).unwrap();
        let sender = state.create_account(1_000).unwrap();
        let receiver = state.create_account(0).unwrap();

        let mut transfer = TransferBuilder::new()
            .hbar(sender, -100)
            .hbar(receiver, 100)
            .build()
            .unwrap();
        transfer.sign(sender).unwrap();
        state.submit_transfer(&mut transfer, &payer).unwrap();

        assert_eq!(state.get_hbar_balance(&sender).unwrap(), 900);
        assert_eq!(state.get_hbar_balance(&payer).unwrap(), 1_000 - FEE);
    }

    #[test]
    fn test_token_transfer_requires_association() {
        let mut state = state();
        let treasury = state.create_account(1_000).unwrap();
        let outsider = state.create_account(1_000).unwrap();
        let token = state
            .create_token(TokenConfig::new("T", "T", treasury).with_initial_supply(500))
            .unwrap();

        let mut transfer = TransferBuilder::new()
            .token(token, treasury, -50)
            .token(token, outsider, 50)
            .build()
            .unwrap();
        let err = state.submit_transfer(&mut transfer, &treasury).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAssociated);
        assert_eq!(state.get_token_balance(&treasury, &token).unwrap(), 500);
        assert_eq!(state.get_hbar_balance(&treasury).unwrap(), 1_000);
    }

    #[test]
    fn test_insufficient_token_balance_is_atomic() {
        let mut state = state();
        let treasury = state.create_account(1_000).unwrap();
        let holder = state.create_account(1_000).unwrap();
        let token = state
            .create_token(TokenConfig::new("T", "T", treasury).with_initial_supply(100))
            .unwrap();
        state.associate(&holder, &token).unwrap();

        // HBAR leg is fine, token leg overdraws the treasury
        let mut transfer = TransferBuilder::new()
            .hbar(holder, -10)
            .hbar(treasury, 10)
            .token(token, treasury, -101)
            .token(token, holder, 101)
            .build()
            .unwrap();
        transfer.sign(holder).unwrap();
        let err = state.submit_transfer(&mut transfer, &treasury).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(state.get_hbar_balance(&holder).unwrap(), 1_000);
        assert_eq!(state.get_hbar_balance(&treasury).unwrap(), 1_000);
        assert_eq!(state.get_token_balance(&holder, &token).unwrap(), 0);
        assert_eq!(state.get_token_balance(&treasury, &token).unwrap(), 100);
    }

    #[test]
    fn test_fee_can_make_payer_insufficient() {
        let mut state = state();
        let alice = state.create_account(100).unwrap();
        let bob = state.create_account(0).unwrap();

        let mut transfer = TransferBuilder::new()
            .hbar(alice, -100)
            .hbar(bob, 100)
            .build()
            .unwrap();
        let err = state.submit_transfer(&mut transfer, &alice).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                account: alice,
                asset: Asset::Hbar,
                need: 100 + FEE,
                have: 100,
            }
        );
        assert_eq!(state.get_hbar_balance(&bob).unwrap(), 0);
    }

    #[test]
    fn test_transfer_cannot_be_resubmitted() {
        let mut state = state();
        let alice = state.create_account(1_000).unwrap();
        let bob = state.create_account(0).unwrap();

        let mut transfer = TransferBuilder::new()
            .hbar(alice, -1)
            .hbar(bob, 1)
            .build()
            .unwrap();
        state.submit_transfer(&mut transfer, &alice).unwrap();

        let err = state.submit_transfer(&mut transfer, &alice).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferFinalized);
        assert_eq!(state.get_hbar_balance(&bob).unwrap(), 1);
    }

    #[test]
    fn test_unknown_receiver_is_not_found() {
        let mut state = state();
        let alice = state.create_account(1_000).unwrap();

        let mut transfer = TransferBuilder::new()
            .hbar(alice, -1)
            .hbar(AccountId::from_num(99_999), 1)
            .build()
            .unwrap();
        let err = state.submit_transfer(&mut transfer, &alice).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(state.get_hbar_balance(&alice).unwrap(), 1_000);
    }
}
