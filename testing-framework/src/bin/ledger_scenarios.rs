// Ledger scenario runner
//
// Usage:
//   ledger-scenarios run scenarios/*.yaml --accounts accounts.yaml
//   ledger-scenarios create-account --balance 1000000000 --count 3 --output accounts.yaml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledger_common::config::FIRST_USER_ENTITY_NUM;
use ledger_common::LedgerBuilder;
use ledger_testing_framework::{
    ConfiguredAccount, ExecutionReport, KeyMaterial, ScenarioExecutor, TestAccounts,
};
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledger-scenarios", version)]
#[command(about = "Run ledger scenario files and manage test accounts")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run scenario files in order
    Run {
        /// Scenario YAML files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Accounts file used by scenarios without genesis accounts
        #[arg(short, long)]
        accounts: Option<PathBuf>,

        /// Read configured accounts from LEDGER_ACCOUNT_<i>_* variables
        #[arg(long, conflicts_with = "accounts")]
        accounts_from_env: bool,

        /// Transaction fee in tinybars, overriding the scenario's
        #[arg(long)]
        fee: Option<u64>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mint funded test accounts and print them as an accounts file
    CreateAccount {
        /// Initial balance in tinybars
        #[arg(short, long)]
        balance: u64,

        /// Number of accounts
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// First account number to allocate
        #[arg(long, default_value_t = FIRST_USER_ENTITY_NUM)]
        first_num: u64,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Args::parse().command {
        Command::Run {
            files,
            accounts,
            accounts_from_env,
            fee,
            json,
        } => {
            let accounts = match accounts {
                Some(path) => Some(TestAccounts::from_yaml_file(path)?),
                None if accounts_from_env => Some(TestAccounts::from_env()?),
                None => None,
            };
            run(files, accounts, fee, json).await
        }
        Command::CreateAccount {
            balance,
            count,
            first_num,
            output,
        } => create_accounts(balance, count, first_num, output),
    }
}

async fn run(
    files: Vec<PathBuf>,
    accounts: Option<TestAccounts>,
    fee: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut failures = 0usize;

    for file in &files {
        let mut executor = ScenarioExecutor::new();
        if let Some(accounts) = &accounts {
            executor = executor.with_accounts(accounts.clone());
        }
        if let Some(fee) = fee {
            executor = executor.with_transaction_fee(fee);
        }

        match executor.execute_file(file).await {
            Ok(report) => print_report(&report, json)?,
            Err(e) => {
                failures += 1;
                error!("{}: {:#}", file.display(), e);
                print_report(
                    &ExecutionReport {
                        scenario_name: file.display().to_string(),
                        steps_executed: executor.current_step(),
                        success: false,
                        log: executor.get_log().to_vec(),
                    },
                    json,
                )?;
            }
        }
    }

    info!("{} of {} scenarios passed", files.len() - failures, files.len());
    anyhow::ensure!(failures == 0, "{} scenario(s) failed", failures);
    Ok(())
}

fn print_report(report: &ExecutionReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        report.print();
    }
    Ok(())
}

fn create_accounts(
    balance: u64,
    count: usize,
    first_num: u64,
    output: Option<PathBuf>,
) -> Result<()> {
    let ledger = LedgerBuilder::new()
        .with_first_entity_num(first_num)
        .with_default_balance(balance)
        .with_funded_account_count(count)
        .build()?;

    let accounts = TestAccounts::new(
        ledger
            .account_ids()
            .into_iter()
            .map(|id| {
                ConfiguredAccount::new(balance)
                    .with_id(id)
                    .with_key(KeyMaterial::generate())
            })
            .collect(),
    );
    let yaml = serde_yaml::to_string(&accounts)?;

    match output {
        Some(path) => {
            std::fs::write(&path, yaml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("{} accounts saved to {}", count, path.display());
        }
        None => print!("{}", yaml),
    }
    Ok(())
}
