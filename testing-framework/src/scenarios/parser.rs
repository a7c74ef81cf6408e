//! YAML scenario parser
//!
//! - No underscores in numbers (use strings: "1000000000000")
//! - Balance assertions support `eq`, `within` and `compare`
//! - Any step may carry `expect: { error: <kind> }`
//!
//! ## Example Scenario
//!
//! ```yaml
//! name: "Token transfer"
//! genesis:
//!   accounts:
//!     - name: "alice"
//!       balance: "100000000000"
//!     - name: "bob"
//!       balance: "100000000000"
//! steps:
//!   - action: "create_token"
//!     token: "htt"
//!     name: "Test Token"
//!     symbol: "HTT"
//!     initial_supply: 500
//!     treasury: "alice"
//!   - action: "associate"
//!     account: "bob"
//!   - action: "build_transfer"
//!     entries:
//!       - { account: "alice", asset: "token", delta: -200 }
//!       - { account: "bob", asset: "token", delta: 200 }
//!   - action: "submit"
//!     payer: "alice"
//!   - action: "assert_balance"
//!     account: "bob"
//!     asset: "token"
//!     eq: 200
//! invariants:
//!   - "token_supply_conservation"
//! ```

use crate::invariants::Invariant;
use crate::numbers::{
    option_u64_from_string_or_number, string_from_scalar, u64_from_string_or_number,
};
use crate::orchestrator::{AssetRef, BalanceExpect, TokenField, TokenSpec, TransferLeg};
use anyhow::Result;
use ledger_common::{AccountId, ErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use strum::AsRefStr;

/// Complete test scenario loaded from YAML
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TestScenario {
    /// Scenario name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Genesis configuration; falls back to the configured accounts when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis: Option<GenesisConfig>,

    /// Execution steps
    pub steps: Vec<ScenarioStep>,

    /// Invariants to check after execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invariants: Option<Vec<String>>,
}

/// Genesis ledger configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GenesisConfig {
    /// Genesis accounts; the first one is the operator
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,

    /// Fee charged per transfer and topic message, in tinybars
    #[serde(
        default,
        deserialize_with = "option_u64_from_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_fee: Option<u64>,
}

/// Genesis account with initial funding
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenesisAccount {
    /// Alias used by the steps (e.g., "alice", "bob")
    pub name: String,

    /// Initial balance in tinybars (supports string or number)
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub balance: u64,

    /// Fixed account id, allocated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AccountId>,
}

/// One step plus its optional expected failure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScenarioStep {
    #[serde(flatten)]
    pub step: Step,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<StepExpect>,
}

/// Expected step failure
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct StepExpect {
    pub error: ErrorKind,
}

/// Test execution step
#[derive(Debug, Deserialize, Serialize, Clone, AsRefStr)]
#[serde(tag = "action", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    /// Bind an alias to a configured account holding at least `min_balance`
    EnsureAccountFunded {
        account: String,
        #[serde(default, deserialize_with = "u64_from_string_or_number")]
        min_balance: u64,
    },

    /// Create a fresh account outside the configured list
    CreateAccount {
        account: String,
        #[serde(default, deserialize_with = "u64_from_string_or_number")]
        balance: u64,
    },

    /// Create a token and make it active
    CreateToken {
        /// Token alias
        token: String,
        #[serde(flatten)]
        spec: TokenSpec,
    },

    /// Associate with the active token
    Associate { account: String },

    /// Associate with the active token and hold exactly `amount`
    AssociateAndFund {
        account: String,
        #[serde(deserialize_with = "u64_from_string_or_number")]
        amount: u64,
    },

    /// Mint on the active token
    Mint {
        #[serde(deserialize_with = "u64_from_string_or_number")]
        amount: u64,
    },

    /// Build the pending transfer
    BuildTransfer { entries: Vec<TransferLeg> },

    /// Sign the pending transfer
    Sign { account: String },

    /// Submit the pending transfer
    Submit { payer: String },

    /// Snapshot an HBAR balance
    CaptureBalance { account: String },

    /// Assert a property of the active token
    AssertToken {
        field: TokenField,
        #[serde(deserialize_with = "string_from_scalar")]
        expected: String,
    },

    /// Assert a balance (supports eq/within/compare)
    AssertBalance {
        account: String,
        #[serde(default)]
        asset: AssetRef,
        #[serde(flatten)]
        expect: BalanceExpect,
    },

    /// Assert the HBAR balance dropped since the last snapshot
    AssertFeePaid { account: String },

    /// Create a topic and make it active
    CreateTopic {
        #[serde(default)]
        memo: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        submit_key: Option<String>,
    },

    /// Subscribe to the active topic
    SubscribeTopic {
        #[serde(
            default,
            deserialize_with = "option_u64_from_string_or_number",
            skip_serializing_if = "Option::is_none"
        )]
        from_sequence: Option<u64>,
    },

    /// Publish on the active topic
    PublishMessage {
        payer: String,
        message: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        signers: Vec<String>,
    },

    /// Assert a message reached the subscription
    AssertMessageReceived { message: String },
}

impl Step {
    /// Account alias this step binds
    fn introduces(&self) -> Option<&str> {
        match self {
            Self::EnsureAccountFunded { account, .. } | Self::CreateAccount { account, .. } => {
                Some(account)
            }
            _ => None,
        }
    }

    /// Token alias this step creates
    fn introduces_token(&self) -> Option<&str> {
        match self {
            Self::CreateToken { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Token aliases named by `asset:` fields
    fn token_references(&self) -> Vec<&str> {
        match self {
            Self::AssertBalance { asset, .. } => asset.token_alias().into_iter().collect(),
            Self::BuildTransfer { entries } => entries
                .iter()
                .filter_map(|leg| leg.asset.token_alias())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Account aliases this step requires to be bound already
    fn references(&self) -> Vec<&str> {
        match self {
            Self::CreateToken { spec, .. } => vec![spec.treasury.as_str()],
            Self::Associate { account }
            | Self::AssociateAndFund { account, .. }
            | Self::Sign { account }
            | Self::CaptureBalance { account }
            | Self::AssertBalance { account, .. }
            | Self::AssertFeePaid { account } => vec![account.as_str()],
            Self::BuildTransfer { entries } => {
                entries.iter().map(|leg| leg.account.as_str()).collect()
            }
            Self::Submit { payer } => vec![payer.as_str()],
            Self::CreateTopic { submit_key, .. } => submit_key.iter().map(String::as_str).collect(),
            Self::PublishMessage { payer, signers, .. } => std::iter::once(payer)
                .chain(signers)
                .map(String::as_str)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Parse YAML scenario file
pub fn parse_scenario(yaml: &str) -> Result<TestScenario> {
    let scenario: TestScenario = serde_yaml::from_str(yaml)
        .map_err(|e| anyhow::anyhow!("Failed to parse YAML scenario: {}", e))?;

    validate_scenario(&scenario)?;

    Ok(scenario)
}

/// Validate scenario structure
fn validate_scenario(scenario: &TestScenario) -> Result<()> {
    anyhow::ensure!(!scenario.name.is_empty(), "Scenario name cannot be empty");
    anyhow::ensure!(
        !scenario.steps.is_empty(),
        "Scenario must have at least one step"
    );

    let mut account_names = HashSet::new();
    if let Some(genesis) = &scenario.genesis {
        let mut account_ids = HashSet::new();
        for account in &genesis.accounts {
            anyhow::ensure!(!account.name.is_empty(), "Account name cannot be empty");
            anyhow::ensure!(
                account_names.insert(&account.name),
                "Duplicate account name: {}",
                account.name
            );
            if let Some(id) = account.id {
                anyhow::ensure!(account_ids.insert(id), "Duplicate account id: {}", id);
            }
        }
    }

    // Aliases must be bound before use
    let mut known: HashSet<&str> = account_names.iter().map(|name| name.as_str()).collect();
    let mut tokens: HashSet<&str> = HashSet::new();
    for (idx, step) in scenario.steps.iter().enumerate() {
        for alias in step.step.references() {
            anyhow::ensure!(
                known.contains(alias),
                "Unknown account '{}' in step {} ({})",
                alias,
                idx + 1,
                step.step.as_ref()
            );
        }
        for alias in step.step.token_references() {
            anyhow::ensure!(
                tokens.contains(alias),
                "Unknown token '{}' in step {} ({})",
                alias,
                idx + 1,
                step.step.as_ref()
            );
        }
        if let Step::CreateAccount { account, .. } = &step.step {
            anyhow::ensure!(
                !known.contains(account.as_str()),
                "Account '{}' is already bound (step {})",
                account,
                idx + 1
            );
        }
        if let Some(alias) = step.step.introduces() {
            known.insert(alias);
        }
        if let Some(alias) = step.step.introduces_token() {
            tokens.insert(alias);
        }
    }

    for invariant in scenario.invariants.iter().flatten() {
        Invariant::from_str(invariant)
            .map_err(|_| anyhow::anyhow!("Unknown invariant: {}", invariant))?;
    }

    Ok(())
}
