//! # Ledger Testing Framework
//!
//! Scenario-driven testing against a deterministic, in-memory token ledger.
//!
//! ## Architecture Overview
//!
//! - **ledger_common**: account, token, transfer and topic semantics
//! - **orchestrator**: step operations over one ledger plus a per-scenario context
//! - **scenarios**: YAML scenario parser and executor
//! - **invariants**: supply and balance conservation checkers
//! - **config**: ordered list of configured test accounts
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ledger_testing_framework::scenarios::{parse_scenario, ScenarioExecutor};
//!
//! #[tokio::test]
//! async fn test_simple_transfer() {
//!     let scenario = parse_scenario(include_str!("../scenarios/account_balance.yaml")).unwrap();
//!     let report = ScenarioExecutor::new().execute(scenario).await.unwrap();
//!     assert!(report.success);
//! }
//! ```
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: no network, no sleeps, sequential ids
//! 2. **Isolated**: a fresh ledger and context per scenario
//! 3. **Atomic**: failed operations never leave partial state
//! 4. **Structural errors**: expected failures are matched by error kind

#![warn(clippy::all)]

/// Configured test accounts (file or environment)
pub mod config;

/// Invariant checkers (supply conservation, HBAR conservation, supply caps)
pub mod invariants;

/// Scenario orchestrator: step operations and per-scenario context
pub mod orchestrator;

/// YAML scenario parser and executor
pub mod scenarios;

mod numbers;

pub use config::{ConfiguredAccount, KeyMaterial, TestAccounts};
pub use orchestrator::{Orchestrator, ScenarioContext, ScenarioError, ScenarioResult};
pub use scenarios::{parse_scenario, ExecutionReport, ScenarioExecutor, TestScenario};

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
