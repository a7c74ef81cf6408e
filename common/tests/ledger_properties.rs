#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//! Property-based tests for the ledger
//!
//! Random sequences of transfers, associations and mints must keep:
//! 1. **Token conservation**: Σ holder balances == total supply
//! 2. **HBAR conservation**: Σ balances + fees collected == HBAR issued
//! 3. **Atomicity**: a failed operation leaves the snapshot untouched

use ledger_common::{
    AccountId, Ledger, LedgerBuilder, SupplyPolicy, TokenConfig, TokenId, TransferBuilder,
};
use proptest::prelude::*;

const ACCOUNTS: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Hbar { from: usize, to: usize, amount: i64 },
    Token { from: usize, to: usize, amount: i64 },
    Associate { account: usize },
    Mint { amount: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, 0..ACCOUNTS, 1i64..2_000).prop_map(|(from, to, amount)| Op::Hbar {
            from,
            to,
            amount
        }),
        (0..ACCOUNTS, 0..ACCOUNTS, 1i64..400).prop_map(|(from, to, amount)| Op::Token {
            from,
            to,
            amount
        }),
        (0..ACCOUNTS).prop_map(|account| Op::Associate { account }),
        (1u64..300).prop_map(|amount| Op::Mint { amount }),
    ]
}

fn setup(balances: &[u64]) -> (Ledger, Vec<AccountId>, TokenId) {
    let mut builder = LedgerBuilder::new().with_transaction_fee(3);
    for balance in balances {
        builder = builder.with_allocated_account(*balance);
    }
    let ledger = builder.build().unwrap();
    let accounts = ledger.account_ids();

    let token = ledger
        .create_token(
            TokenConfig::new("Prop", "PRP", accounts[0])
                .with_initial_supply(1_000)
                .with_supply_policy(SupplyPolicy::Finite { max_supply: 2_000 })
                .with_mint_authority(accounts[0]),
        )
        .unwrap();
    (ledger, accounts, token)
}

fn apply(ledger: &Ledger, accounts: &[AccountId], token: TokenId, op: &Op) -> bool {
    match op {
        Op::Hbar { from, to, amount } => {
            let (from, to) = (accounts[*from], accounts[*to]);
            let mut transfer = TransferBuilder::new()
                .hbar(from, -amount)
                .hbar(to, *amount)
                .build()
                .unwrap();
            ledger.submit(&mut transfer, &from).is_ok()
        }
        Op::Token { from, to, amount } => {
            let (from, to) = (accounts[*from], accounts[*to]);
            let mut transfer = TransferBuilder::new()
                .token(token, from, -amount)
                .token(token, to, *amount)
                .build()
                .unwrap();
            ledger.submit(&mut transfer, &from).is_ok()
        }
        Op::Associate { account } => ledger.associate(&accounts[*account], &token).is_ok(),
        Op::Mint { amount } => ledger.mint(&token, *amount).is_ok(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ledger_invariants_hold(
        balances in prop::collection::vec(0u64..5_000, ACCOUNTS),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let (ledger, accounts, token) = setup(&balances);

        for op in &ops {
            let before = ledger.snapshot();
            let committed = apply(&ledger, &accounts, token, op);
            let after = ledger.snapshot();

            if !committed {
                prop_assert_eq!(&before, &after, "failed op {:?} changed state", op);
            }

            let info = after.tokens.iter().find(|t| t.token_id == token).unwrap();
            prop_assert_eq!(after.token_holdings(&token), u128::from(info.total_supply));
            prop_assert!(info.total_supply <= 2_000);
            prop_assert_eq!(
                after.total_hbar() + u128::from(after.fees_collected),
                after.hbar_issued
            );
        }
    }
}
