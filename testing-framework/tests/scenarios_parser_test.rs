#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::useless_vec)]
//! Standalone test for scenarios parser
//!
//! Tests parser functionality independently of any ledger

use ledger_common::ErrorKind;
use ledger_testing_framework::orchestrator::{AssetRef, BalanceExpect, CompareOp};
use ledger_testing_framework::scenarios::{parse_scenario, Step};

#[test]
fn test_parse_simple_scenario() {
    let yaml = r#"
name: "Test Scenario"
description: "A simple test"
genesis:
  transaction_fee: "50"
  accounts:
    - name: "alice"
      balance: "1000000000000"
    - name: "bob"
      balance: "0"
      id: "0.0.2"
steps:
  - action: "build_transfer"
    entries:
      - { account: "alice", delta: "-100000000000" }
      - { account: "bob", asset: "hbar", delta: 100000000000 }
  - action: "submit"
    payer: "alice"
  - action: "assert_balance"
    account: "bob"
    eq: "100000000000"
invariants:
  - "hbar_conservation"
"#;

    let scenario = parse_scenario(yaml).expect("Failed to parse");
    assert_eq!(scenario.name, "Test Scenario");
    let genesis = scenario.genesis.as_ref().unwrap();
    assert_eq!(genesis.accounts.len(), 2);
    assert_eq!(genesis.transaction_fee, Some(50));
    assert_eq!(genesis.accounts[1].id.unwrap().to_string(), "0.0.2");
    assert_eq!(scenario.steps.len(), 3);

    match &scenario.steps[0].step {
        Step::BuildTransfer { entries } => {
            assert_eq!(entries[0].delta, -100_000_000_000);
            assert_eq!(entries[1].asset, AssetRef::Hbar);
        }
        other => panic!("unexpected step {:?}", other),
    }
}

#[test]
fn test_parse_all_scenarios() {
    let scenarios = vec![
        include_str!("../scenarios/account_balance.yaml"),
        include_str!("../scenarios/token_service.yaml"),
        include_str!("../scenarios/multi_party_transfer.yaml"),
        include_str!("../scenarios/unsigned_transfer.yaml"),
        include_str!("../scenarios/topic_messages.yaml"),
    ];

    for (idx, yaml) in scenarios.iter().enumerate() {
        match parse_scenario(yaml) {
            Ok(scenario) => {
                println!(
                    "✓ Scenario {}: {} parsed successfully",
                    idx + 1,
                    scenario.name
                );
            }
            Err(e) => {
                panic!("Failed to parse scenario {}: {}", idx + 1, e);
            }
        }
    }
}

#[test]
fn test_assertion_modes() {
    let yaml = r#"
name: "Assertions"
genesis:
  accounts:
    - { name: "alice", balance: 1000 }
steps:
  - action: "assert_balance"
    account: "alice"
    within:
      target: "1000"
      tolerance: "10"
  - action: "assert_balance"
    account: "alice"
    asset: "token"
    compare:
      gte: 1
  - action: "assert_token"
    field: "supply_type"
    expected: "finite"
"#;
    let scenario = parse_scenario(yaml).unwrap();

    match &scenario.steps[0].step {
        Step::AssertBalance { expect, asset, .. } => {
            assert_eq!(*asset, AssetRef::Hbar);
            assert_eq!(*expect, BalanceExpect::within(1000, 10));
        }
        other => panic!("unexpected step {:?}", other),
    }
    match &scenario.steps[1].step {
        Step::AssertBalance { expect, asset, .. } => {
            assert_eq!(*asset, AssetRef::ActiveToken);
            assert_eq!(
                *expect,
                BalanceExpect::Compare {
                    compare: CompareOp::Gte { gte: 1 }
                }
            );
        }
        other => panic!("unexpected step {:?}", other),
    }
}

#[test]
fn test_expected_errors_parse_as_kinds() {
    let scenario = parse_scenario(include_str!("../scenarios/token_service.yaml")).unwrap();
    let kinds: Vec<ErrorKind> = scenario
        .steps
        .iter()
        .filter_map(|step| step.expect.map(|expect| expect.error))
        .collect();

    assert!(kinds.contains(&ErrorKind::SupplyCapExceeded));
    assert!(kinds.contains(&ErrorKind::NoMintAuthority));
    assert!(kinds.contains(&ErrorKind::AlreadyAssociated));
    assert!(kinds.contains(&ErrorKind::NotAssociated));
    assert!(kinds.contains(&ErrorKind::InvalidConfig));
}

#[test]
fn test_validation_errors() {
    // Duplicate accounts
    let bad_yaml1 = r#"
name: "Bad"
genesis:
  accounts:
    - { name: "alice", balance: 1000 }
    - { name: "alice", balance: 2000 }
steps:
  - action: "mint"
    amount: 1
"#;
    assert!(parse_scenario(bad_yaml1).is_err());

    // Unknown payer
    let bad_yaml2 = r#"
name: "Bad"
genesis:
  accounts:
    - { name: "alice", balance: 1000 }
steps:
  - action: "submit"
    payer: "charlie"
"#;
    assert!(parse_scenario(bad_yaml2).is_err());

    // Negative balance
    let bad_yaml3 = r#"
name: "Bad"
genesis:
  accounts:
    - { name: "alice", balance: -5 }
steps:
  - action: "mint"
    amount: 1
"#;
    assert!(parse_scenario(bad_yaml3).is_err());

    // Empty steps
    let bad_yaml4 = r#"
name: "Bad"
genesis:
  accounts:
    - { name: "alice", balance: 1000 }
steps: []
"#;
    assert!(parse_scenario(bad_yaml4).is_err());

    // Unknown error kind
    let bad_yaml5 = r#"
name: "Bad"
steps:
  - action: "mint"
    amount: 1
    expect:
      error: "exploded"
"#;
    assert!(parse_scenario(bad_yaml5).is_err());

    // Underscores in numbers
    let bad_yaml6 = r#"
name: "Bad"
steps:
  - action: "mint"
    amount: "1_000"
"#;
    assert!(parse_scenario(bad_yaml6).is_err());

    // Empty name
    let bad_yaml7 = r#"
name: ""
steps:
  - action: "mint"
    amount: 1
"#;
    assert!(parse_scenario(bad_yaml7).is_err());
}
