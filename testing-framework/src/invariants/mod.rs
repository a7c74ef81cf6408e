//! Core invariant checkers
//!
//! Implements ledger invariants:
//! - Token supply conservation (holdings equal total supply)
//! - Supply cap (finite tokens never exceed their maximum)
//! - HBAR conservation (balances plus collected fees equal issued HBAR)

use anyhow::{bail, Result};
use ledger_common::{LedgerSnapshot, SupplyPolicy};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Invariants a scenario can request by name
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Invariant {
    TokenSupplyConservation,
    SupplyCap,
    HbarConservation,
}

impl Invariant {
    pub const ALL: [Invariant; 3] = [
        Invariant::TokenSupplyConservation,
        Invariant::SupplyCap,
        Invariant::HbarConservation,
    ];

    pub fn check(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        match self {
            Self::TokenSupplyConservation => check_token_supply_conservation(snapshot),
            Self::SupplyCap => check_supply_cap(snapshot),
            Self::HbarConservation => check_hbar_conservation(snapshot),
        }
    }
}

/// Run every invariant against `snapshot`
pub fn check_all(snapshot: &LedgerSnapshot) -> Result<()> {
    for invariant in Invariant::ALL {
        invariant.check(snapshot)?;
    }
    Ok(())
}

/// Check balance conservation invariant
///
/// Verifies that the total before and after an operation are equal.
///
/// # Errors
/// Returns error if totals don't match (conservation violated)
pub fn check_balance_conservation(total_before: u128, total_after: u128) -> Result<()> {
    if total_before != total_after {
        bail!(
            "Balance conservation violated: total before ({}) != total after ({}), difference: {}",
            total_before,
            total_after,
            if total_before > total_after {
                format!("-{}", total_before - total_after)
            } else {
                format!("+{}", total_after - total_before)
            }
        );
    }
    Ok(())
}

/// Check balance conservation with fee consideration
///
/// Fees leave the account balances, so the total after should be lower by
/// exactly the fees collected.
pub fn check_balance_conservation_with_fees(
    total_before: u128,
    total_after: u128,
    fees_collected: u128,
) -> Result<()> {
    let expected_after = total_before.checked_sub(fees_collected).ok_or_else(|| {
        anyhow::anyhow!(
            "Fee calculation underflow: total {} < fees {}",
            total_before,
            fees_collected
        )
    })?;

    if total_after != expected_after {
        bail!(
            "Balance conservation with fees violated: expected {} (before {} - fees {}), got {}",
            expected_after,
            total_before,
            fees_collected,
            total_after
        );
    }
    Ok(())
}

/// Calculate sum of balances with overflow checking
pub fn sum_balances(balances: &[u64]) -> Result<u128> {
    balances.iter().try_fold(0u128, |acc, &balance| {
        acc.checked_add(u128::from(balance)).ok_or_else(|| {
            anyhow::anyhow!(
                "Balance sum overflow at accumulator {}, adding {}",
                acc,
                balance
            )
        })
    })
}

/// Per token, the balances of all holders add up to the total supply
pub fn check_token_supply_conservation(snapshot: &LedgerSnapshot) -> Result<()> {
    for token in &snapshot.tokens {
        let balances: Vec<u64> = snapshot
            .accounts
            .iter()
            .filter_map(|account| account.token_balance(&token.token_id))
            .collect();
        let held = sum_balances(&balances)?;

        if held != u128::from(token.total_supply) {
            bail!(
                "Token supply conservation violated for {}: holders have {}, total supply is {}",
                token.token_id,
                held,
                token.total_supply
            );
        }
    }
    Ok(())
}

/// Finite tokens stay within their maximum supply
pub fn check_supply_cap(snapshot: &LedgerSnapshot) -> Result<()> {
    for token in &snapshot.tokens {
        if let SupplyPolicy::Finite { max_supply } = token.supply_policy {
            if token.total_supply > max_supply {
                bail!(
                    "Supply cap violated for {}: total supply {} > max supply {}",
                    token.token_id,
                    token.total_supply,
                    max_supply
                );
            }
        }
    }
    Ok(())
}

/// All issued HBAR is either held by an account or collected as fees
pub fn check_hbar_conservation(snapshot: &LedgerSnapshot) -> Result<()> {
    check_balance_conservation_with_fees(
        snapshot.hbar_issued,
        snapshot.total_hbar(),
        u128::from(snapshot.fees_collected),
    )
}
