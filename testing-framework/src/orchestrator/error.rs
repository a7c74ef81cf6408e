use ledger_common::{AccountId, ErrorKind, LedgerError};
use thiserror::Error;

/// Errors raised by orchestrator operations
///
/// Ledger failures pass through unchanged so scenarios can match on their kind.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("No balance snapshot captured for '{0}'")]
    NoSnapshot(String),

    #[error("Unknown account alias '{0}'")]
    UnknownAlias(String),

    #[error("Alias '{alias}' is already bound to {account}")]
    AliasInUse { alias: String, account: AccountId },

    #[error("Unknown token alias '{0}'")]
    UnknownToken(String),

    #[error("No token has been created in this scenario")]
    NoActiveToken,

    #[error("No topic has been created in this scenario")]
    NoActiveTopic,

    #[error("No topic subscription is open")]
    NotSubscribed,

    #[error("No transfer is pending")]
    NoPendingTransfer,

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Invalid step: {0}")]
    InvalidStep(String),
}

impl ScenarioError {
    /// Kind used to match `expect: { error: ... }` in scenario files
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Ledger(e) => Some(e.kind()),
            Self::NoSnapshot(_) => Some(ErrorKind::NoSnapshot),
            _ => None,
        }
    }

    /// Assertion failures are test failures, everything else is an operation error
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed(_))
    }
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
