//! DSL scenario parser and executor
//!
//! Scenario files describe a ledger setup and an ordered list of steps:
//! - `within {target, tolerance}` and `compare {gte|lte|gt|lt}` assertions
//! - `expect: { error: <kind> }` on any step that must fail
//! - No `_` in numbers (use strings: "1000000000000")
//!
//! ## Example Scenario
//!
//! ```yaml
//! name: "Unsigned transfer"
//! description: "A debited account that did not sign blocks the transfer"
//! genesis:
//!   accounts:
//!     - name: "alice"
//!       balance: "1000000000"
//!     - name: "bob"
//!       balance: "1000000000"
//! steps:
//!   - action: "build_transfer"
//!     entries:
//!       - { account: "bob", delta: -500 }
//!       - { account: "alice", delta: 500 }
//!   - action: "submit"
//!     payer: "alice"
//!     expect:
//!       error: "missing_signature"
//!   - action: "assert_balance"
//!     account: "bob"
//!     eq: "1000000000"
//! invariants:
//!   - "hbar_conservation"
//! ```

pub mod executor;
pub mod parser;

pub use executor::{ExecutionReport, ScenarioExecutor};
pub use parser::{parse_scenario, ScenarioStep, Step, StepExpect, TestScenario};
