//! Configured test accounts
//!
//! An ordered list of accounts the harness may bind aliases to. The first
//! entry is the operator. Accounts come from a YAML file:
//!
//! ```yaml
//! transaction_fee: 100000
//! accounts:
//!   - id: "0.0.2"
//!     key: "302e0201..."
//!     balance: "1000000000000"
//!   - balance: 500000000
//! ```
//!
//! or from the environment (`LEDGER_ACCOUNT_0_ID`, `LEDGER_ACCOUNT_0_KEY`,
//! `LEDGER_ACCOUNT_0_BALANCE`, then index 1, ...).

use crate::numbers::{option_u64_from_string_or_number, u64_from_string_or_number};
use anyhow::{Context, Result};
use ledger_common::{AccountId, Ledger, LedgerBuilder, LedgerResult};
use log::{debug, info};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Environment variable prefix for configured accounts
pub const ENV_PREFIX: &str = "LEDGER_ACCOUNT";

/// Length of generated key material in bytes
pub const KEY_LENGTH: usize = 32;

/// Opaque private key material, hex encoded
///
/// The ledger authorizes by account id, so keys are carried for the
/// accounts file only and never printed through `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyMaterial(String);

impl KeyMaterial {
    /// Generate random key material
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn from_hex(value: &str) -> Result<Self, hex::FromHexError> {
        let value = value.trim().trim_start_matches("0x");
        hex::decode(value)?;
        Ok(Self(value.to_lowercase()))
    }

    pub fn to_hex(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KeyMaterial {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<KeyMaterial> for String {
    fn from(value: KeyMaterial) -> Self {
        value.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// One configured account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredAccount {
    /// Fixed id; allocated at ledger creation when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AccountId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyMaterial>,

    /// Initial HBAR balance in tinybars
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub balance: u64,
}

impl ConfiguredAccount {
    pub fn new(balance: u64) -> Self {
        Self {
            id: None,
            key: None,
            balance,
        }
    }

    pub fn with_id(mut self, id: AccountId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_key(mut self, key: KeyMaterial) -> Self {
        self.key = Some(key);
        self
    }
}

/// Ordered list of configured accounts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAccounts {
    #[serde(
        default,
        deserialize_with = "option_u64_from_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_fee: Option<u64>,

    pub accounts: Vec<ConfiguredAccount>,
}

impl TestAccounts {
    pub fn new(accounts: Vec<ConfiguredAccount>) -> Self {
        Self {
            transaction_fee: None,
            accounts,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let accounts: Self =
            serde_yaml::from_str(yaml).context("Failed to parse accounts configuration")?;
        accounts.validate()?;
        Ok(accounts)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read accounts file {}", path.display()))?;
        let accounts = Self::from_yaml_str(&yaml)
            .with_context(|| format!("Invalid accounts file {}", path.display()))?;
        info!(
            "Loaded {} configured accounts from {}",
            accounts.accounts.len(),
            path.display()
        );
        Ok(accounts)
    }

    /// Read `LEDGER_ACCOUNT_<i>_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read configured accounts through `lookup`, stopping at the first index
    /// with neither an id nor a balance
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut accounts = Vec::new();

        for index in 0.. {
            let var = |suffix: &str| format!("{}_{}_{}", ENV_PREFIX, index, suffix);
            let id = lookup(&var("ID"));
            let balance = lookup(&var("BALANCE"));
            if id.is_none() && balance.is_none() {
                break;
            }

            let mut account = ConfiguredAccount::new(match balance {
                Some(balance) => balance
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {}", var("BALANCE")))?,
                None => 0,
            });
            if let Some(id) = id {
                account = account.with_id(
                    id.parse()
                        .with_context(|| format!("Invalid {}", var("ID")))?,
                );
            }
            if let Some(key) = lookup(&var("KEY")) {
                account = account.with_key(
                    KeyMaterial::from_hex(&key)
                        .with_context(|| format!("Invalid {}", var("KEY")))?,
                );
            }
            accounts.push(account);
        }

        let accounts = Self::new(accounts);
        accounts.validate()?;
        debug!(
            "Loaded {} configured accounts from environment",
            accounts.accounts.len()
        );
        Ok(accounts)
    }

    /// At least one account, no duplicate ids
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.accounts.is_empty(),
            "At least one configured account is required"
        );

        let mut ids = HashSet::new();
        for id in self.accounts.iter().filter_map(|account| account.id) {
            anyhow::ensure!(ids.insert(id), "Duplicate configured account id: {}", id);
        }
        Ok(())
    }

    /// Create a ledger holding these accounts, returning their ids in order
    ///
    /// `fee_override` wins over the configured transaction fee.
    pub fn build_ledger(
        &self,
        fee_override: Option<u64>,
    ) -> LedgerResult<(Ledger, Vec<AccountId>)> {
        let mut builder = LedgerBuilder::new();
        if let Some(fee) = fee_override.or(self.transaction_fee) {
            builder = builder.with_transaction_fee(fee);
        }
        for account in &self.accounts {
            if let Some(id) = account.id {
                builder = builder.with_funded_account(id, account.balance);
            }
        }
        let ledger = builder.build()?;

        let ids = self
            .accounts
            .iter()
            .map(|account| match account.id {
                Some(id) => Ok(id),
                None => ledger.create_account(account.balance),
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        Ok((ledger, ids))
    }
}
