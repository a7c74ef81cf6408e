//! YAML scenario execution engine
//!
//! This module executes parsed YAML scenarios against a fresh ledger and
//! orchestrator per scenario.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_testing_framework::scenarios::{ScenarioExecutor, parse_scenario};
//!
//! let yaml = r#"
//! name: "Simple Transfer"
//! genesis:
//!   transaction_fee: 50
//!   accounts:
//!     - name: "alice"
//!       balance: "1000000000000"
//!     - name: "bob"
//!       balance: "0"
//! steps:
//!   - action: "build_transfer"
//!     entries:
//!       - { account: "alice", delta: "-100000000000" }
//!       - { account: "bob", delta: "100000000000" }
//!   - action: "submit"
//!     payer: "alice"
//!   - action: "assert_balance"
//!     account: "alice"
//!     eq: "899999999950"
//! "#;
//!
//! let scenario = parse_scenario(yaml)?;
//! let mut executor = ScenarioExecutor::new();
//! let report = executor.execute(scenario).await?;
//!
//! assert!(report.success);
//! ```

use super::parser::{parse_scenario, ScenarioStep, Step, TestScenario};
use crate::config::{ConfiguredAccount, TestAccounts};
use crate::invariants::Invariant;
use crate::orchestrator::{Orchestrator, ScenarioResult};
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

/// Scenario executor that runs parsed YAML scenarios
pub struct ScenarioExecutor {
    /// Accounts used when a scenario has no genesis accounts
    accounts: Option<TestAccounts>,

    /// Fee overriding both the genesis and the configured fee
    transaction_fee: Option<u64>,

    /// Execution log
    log: Vec<String>,

    /// Current step number (1-indexed)
    current_step: usize,
}

impl ScenarioExecutor {
    /// Create new executor
    pub fn new() -> Self {
        Self {
            accounts: None,
            transaction_fee: None,
            log: Vec::new(),
            current_step: 0,
        }
    }

    pub fn with_accounts(mut self, accounts: TestAccounts) -> Self {
        self.accounts = Some(accounts);
        self
    }

    pub fn with_transaction_fee(mut self, fee: u64) -> Self {
        self.transaction_fee = Some(fee);
        self
    }

    /// Read, parse and execute a scenario file
    pub async fn execute_file(&mut self, path: impl AsRef<Path>) -> Result<ExecutionReport> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let scenario = parse_scenario(&yaml)
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        self.execute(scenario).await
    }

    /// Execute a complete scenario
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Genesis setup fails
    /// - Any step fails other than with its expected error
    /// - A step expected to fail succeeds
    /// - Any requested invariant is violated
    pub async fn execute(&mut self, scenario: TestScenario) -> Result<ExecutionReport> {
        self.log.clear();
        self.current_step = 0;

        info!("Starting scenario: {}", scenario.name);
        self.log(format!("Starting scenario: {}", scenario.name));
        if let Some(desc) = &scenario.description {
            self.log(format!("Description: {}", desc));
        }

        let mut orchestrator = self.setup_genesis(&scenario)?;

        for (idx, step) in scenario.steps.iter().enumerate() {
            self.current_step = idx + 1;
            self.log(format!(
                "\n--- Step {}: {} ---",
                self.current_step,
                step.step.as_ref()
            ));

            self.run_step(&mut orchestrator, step)
                .with_context(|| format!("Failed at step {} ({:?})", self.current_step, step))?;
        }

        if let Some(invariants) = &scenario.invariants {
            self.log("\n--- Checking Invariants ---".to_string());
            let snapshot = orchestrator.ledger().snapshot();
            for name in invariants {
                let invariant = Invariant::from_str(name)
                    .map_err(|_| anyhow::anyhow!("Unknown invariant: {}", name))?;
                invariant.check(&snapshot)?;
                self.log(format!("  ✓ {}", invariant));
            }
        }

        self.log("\n=== Scenario completed successfully ===".to_string());
        info!(
            "Scenario '{}' passed ({} steps)",
            scenario.name, self.current_step
        );

        Ok(ExecutionReport {
            scenario_name: scenario.name,
            steps_executed: self.current_step,
            success: true,
            log: self.log.clone(),
        })
    }

    /// Build the ledger and bind genesis names
    fn setup_genesis(&mut self, scenario: &TestScenario) -> Result<Orchestrator> {
        self.log("Setting up genesis...".to_string());

        let genesis = scenario.genesis.clone().unwrap_or_default();
        let fee = self.transaction_fee.or(genesis.transaction_fee);

        let (accounts, names) = if genesis.accounts.is_empty() {
            let accounts = self.accounts.clone().context(
                "Scenario has no genesis accounts and no accounts configuration was supplied",
            )?;
            (accounts, Vec::new())
        } else {
            let configured = genesis
                .accounts
                .iter()
                .map(|account| ConfiguredAccount {
                    id: account.id,
                    key: None,
                    balance: account.balance,
                })
                .collect();
            let names = genesis
                .accounts
                .iter()
                .map(|account| account.name.clone())
                .collect();
            (TestAccounts::new(configured), names)
        };

        let (ledger, ids) = accounts.build_ledger(fee)?;
        let mut orchestrator = Orchestrator::new(ledger, ids.clone())?;

        for (name, id) in names.iter().zip(&ids) {
            orchestrator.bind_account(name, *id)?;
            self.log(format!("  Account '{}': {}", name, id));
        }

        self.log(format!(
            "Genesis complete: {} accounts, fee {}",
            ids.len(),
            orchestrator.ledger().transaction_fee()
        ));
        Ok(orchestrator)
    }

    /// Execute a single step and match it against its expectation
    fn run_step(&mut self, orchestrator: &mut Orchestrator, step: &ScenarioStep) -> Result<()> {
        let outcome = Self::apply(orchestrator, &step.step);

        match (step.expect, outcome) {
            (None, Ok(summary)) => {
                self.log(format!("  ✓ {}", summary));
                Ok(())
            }
            (None, Err(e)) => Err(e.into()),
            (Some(expect), Ok(_)) => {
                anyhow::bail!(
                    "Expected step to fail with {}, but it succeeded",
                    expect.error
                )
            }
            (Some(expect), Err(e)) if e.kind() == Some(expect.error) => {
                self.log(format!("  ✓ Failed as expected: {}", e));
                Ok(())
            }
            (Some(expect), Err(e)) => {
                Err(anyhow::Error::new(e).context(format!("Expected {} error", expect.error)))
            }
        }
    }

    /// Dispatch one step to the orchestrator, returning a log line
    fn apply(orchestrator: &mut Orchestrator, step: &Step) -> ScenarioResult<String> {
        Ok(match step {
            Step::EnsureAccountFunded {
                account,
                min_balance,
            } => {
                let id = orchestrator.ensure_account_funded(account, *min_balance)?;
                format!("'{}' is {} with at least {}", account, id, min_balance)
            }
            Step::CreateAccount { account, balance } => {
                let id = orchestrator.create_account(account, *balance)?;
                format!("'{}' created as {}", account, id)
            }
            Step::CreateToken { token, spec } => {
                let id = orchestrator.create_token(token, spec)?;
                format!("Token '{}' created as {}", token, id)
            }
            Step::Associate { account } => {
                orchestrator.associate(account)?;
                format!("'{}' associated", account)
            }
            Step::AssociateAndFund { account, amount } => {
                orchestrator.associate_and_fund(account, *amount)?;
                format!("'{}' holds {} units", account, amount)
            }
            Step::Mint { amount } => {
                let supply = orchestrator.mint(*amount)?;
                format!("Minted {}, total supply {}", amount, supply)
            }
            Step::BuildTransfer { entries } => {
                orchestrator.build_transfer(entries)?;
                format!("Transfer built with {} entries", entries.len())
            }
            Step::Sign { account } => {
                orchestrator.sign_pending(account)?;
                format!("Signed by '{}'", account)
            }
            Step::Submit { payer } => {
                let receipt = orchestrator.submit_pending(payer)?;
                format!("Transfer committed, fee {}", receipt.fee_charged)
            }
            Step::CaptureBalance { account } => {
                let balance = orchestrator.capture_balance(account)?;
                format!("Captured '{}' at {}", account, balance)
            }
            Step::AssertToken { field, expected } => {
                orchestrator.assert_token_field(*field, expected)?;
                format!("Token {} is {}", field, expected)
            }
            Step::AssertBalance {
                account,
                asset,
                expect,
            } => {
                let held = orchestrator.assert_balance(account, asset, expect)?;
                format!("Balance of '{}' {}", account, held)
            }
            Step::AssertFeePaid { account } => {
                orchestrator.assert_fee_was_paid(account)?;
                format!("'{}' paid a fee", account)
            }
            Step::CreateTopic { memo, submit_key } => {
                let id = orchestrator.create_topic(memo, submit_key.as_deref())?;
                format!("Topic created as {}", id)
            }
            Step::SubscribeTopic { from_sequence } => {
                orchestrator.subscribe_topic(*from_sequence)?;
                "Subscribed".to_string()
            }
            Step::PublishMessage {
                payer,
                message,
                signers,
            } => {
                let published = orchestrator.publish_message(payer, signers, message)?;
                format!(
                    "Message #{} published (running hash {})",
                    published.sequence_number, published.running_hash
                )
            }
            Step::AssertMessageReceived { message } => {
                orchestrator.assert_message_received(message)?;
                format!("Received '{}'", message)
            }
        })
    }

    /// Add log entry
    fn log(&mut self, message: String) {
        self.log.push(message);
    }

    /// Get execution log
    pub fn get_log(&self) -> &[String] {
        &self.log
    }

    /// Step reached by the last execution (1-indexed)
    pub fn current_step(&self) -> usize {
        self.current_step
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Execution report
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Scenario name
    pub scenario_name: String,

    /// Number of steps executed
    pub steps_executed: usize,

    /// Whether execution succeeded
    pub success: bool,

    /// Execution log
    pub log: Vec<String>,
}

impl ExecutionReport {
    /// Print report to stdout
    pub fn print(&self) {
        println!("\n╔════════════════════════════════════════════════════════════╗");
        println!("║  Scenario Execution Report                                 ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║  Name: {:<50} ║", self.scenario_name);
        println!("║  Steps: {:<48} ║", self.steps_executed);
        println!(
            "║  Status: {:<47} ║",
            if self.success {
                "SUCCESS ✓"
            } else {
                "FAILED ✗"
            }
        );
        println!("╚════════════════════════════════════════════════════════════╝\n");

        println!("Execution Log:");
        println!("═════════════");
        for entry in &self.log {
            println!("{}", entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_transfer_scenario() {
        let yaml = r#"
name: "Simple Transfer"
description: "Basic transfer between two accounts"
genesis:
  transaction_fee: 50
  accounts:
    - name: "alice"
      balance: "1000000000000"
    - name: "bob"
      balance: "0"
steps:
  - action: "build_transfer"
    entries:
      - { account: "alice", delta: "-100000000000" }
      - { account: "bob", delta: "100000000000" }
  - action: "submit"
    payer: "alice"
  - action: "assert_balance"
    account: "alice"
    eq: "899999999950"
  - action: "assert_balance"
    account: "bob"
    eq: "100000000000"
  - action: "assert_fee_paid"
    account: "alice"
invariants:
  - "hbar_conservation"
"#;

        let scenario = parse_scenario(yaml).unwrap();
        let mut executor = ScenarioExecutor::new();
        let report = executor.execute(scenario).await.unwrap();

        assert!(report.success);
        assert_eq!(report.steps_executed, 5);
        assert!(report.log.iter().any(|line| line.contains("hbar_conservation")));
    }

    #[tokio::test]
    async fn test_expected_error_matches_kind() {
        let yaml = r#"
name: "Unbalanced"
genesis:
  accounts:
    - name: "alice"
      balance: 1000
    - name: "bob"
      balance: 0
steps:
  - action: "build_transfer"
    entries:
      - { account: "alice", delta: -100 }
      - { account: "bob", delta: 60 }
    expect:
      error: "unbalanced"
"#;
        let report = ScenarioExecutor::new()
            .execute(parse_scenario(yaml).unwrap())
            .await
            .unwrap();
        assert!(report.success);

        let wrong_kind = yaml.replace("\"unbalanced\"", "\"missing_signature\"");
        let err = ScenarioExecutor::new()
            .execute(parse_scenario(&wrong_kind).unwrap())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Expected missing_signature error"));
    }

    #[tokio::test]
    async fn test_unexpected_success_fails() {
        let yaml = r#"
name: "Should fail"
genesis:
  accounts:
    - name: "alice"
      balance: 1000
steps:
  - action: "capture_balance"
    account: "alice"
    expect:
      error: "no_snapshot"
"#;
        let err = ScenarioExecutor::new()
            .execute(parse_scenario(yaml).unwrap())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("but it succeeded"));
    }

    #[tokio::test]
    async fn test_configured_accounts_used_without_genesis() {
        let yaml = r#"
name: "Configured"
steps:
  - action: "ensure_account_funded"
    account: "first"
    min_balance: 100
  - action: "ensure_account_funded"
    account: "second"
    min_balance: 100
  - action: "assert_balance"
    account: "second"
    eq: 100
"#;
        let scenario = parse_scenario(yaml).unwrap();

        assert!(ScenarioExecutor::new()
            .execute(scenario.clone())
            .await
            .is_err());

        let accounts = TestAccounts::new(vec![ConfiguredAccount::new(1_000_000)]);
        let report = ScenarioExecutor::new()
            .with_accounts(accounts)
            .with_transaction_fee(1)
            .execute(scenario)
            .await
            .unwrap();
        assert!(report.success);
    }
}
