//! Ledger Error Codes
//!
//! Range: 0x0100 - 0x01FF
//! Format: LEDGER_ERROR_<SPECIFIC>

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::entity::{AccountId, Asset, EntityId, EntityKind, TokenId};
use crate::transfer::TransferStatus;

pub const LEDGER_ERROR_NOT_FOUND: u64 = 0x0100;
pub const LEDGER_ERROR_INSUFFICIENT_FUNDS: u64 = 0x0101;
pub const LEDGER_ERROR_NOT_ASSOCIATED: u64 = 0x0102;
pub const LEDGER_ERROR_ALREADY_ASSOCIATED: u64 = 0x0103;
pub const LEDGER_ERROR_INVALID_CONFIG: u64 = 0x0104;
pub const LEDGER_ERROR_NO_MINT_AUTHORITY: u64 = 0x0105;
pub const LEDGER_ERROR_SUPPLY_CAP_EXCEEDED: u64 = 0x0106;
pub const LEDGER_ERROR_UNBALANCED: u64 = 0x0107;
pub const LEDGER_ERROR_MISSING_SIGNATURE: u64 = 0x0108;
pub const LEDGER_ERROR_INVALID_AMOUNT: u64 = 0x0109;
pub const LEDGER_ERROR_INVALID_MESSAGE: u64 = 0x010A;
pub const LEDGER_ERROR_OVERFLOW: u64 = 0x010B;
pub const LEDGER_ERROR_TRANSFER_FINALIZED: u64 = 0x010C;

/// Coarse error classification
///
/// The snake_case names are what scenario files use in `expect: { error: ... }`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InsufficientFunds,
    NotAssociated,
    AlreadyAssociated,
    InvalidConfig,
    NoMintAuthority,
    SupplyCapExceeded,
    Unbalanced,
    MissingSignature,
    InvalidAmount,
    InvalidMessage,
    Overflow,
    TransferFinalized,
    // Raised by the scenario layer, never by the ledger itself
    NoSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("Insufficient funds on {account} for {asset}: need {need}, have {have}")]
    InsufficientFunds {
        account: AccountId,
        asset: Asset,
        need: u64,
        have: u64,
    },

    #[error("Account {account} is not associated with token {token}")]
    NotAssociated { account: AccountId, token: TokenId },

    #[error("Account {account} is already associated with token {token}")]
    AlreadyAssociated { account: AccountId, token: TokenId },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Token {0} has no mint authority")]
    NoMintAuthority(TokenId),

    #[error("Supply cap exceeded for token {token}: max {max}, would have {would_have}")]
    SupplyCapExceeded {
        token: TokenId,
        max: u64,
        would_have: u64,
    },

    #[error("Unbalanced transfer of {asset}: entries sum to {sum}")]
    Unbalanced { asset: Asset, sum: i128 },

    #[error("Missing signature from {0}")]
    MissingSignature(AccountId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Transfer is already {status}")]
    TransferFinalized { status: TransferStatus },
}

impl LedgerError {
    pub fn account_not_found(id: &AccountId) -> Self {
        Self::NotFound {
            kind: EntityKind::Account,
            id: id.entity_id(),
        }
    }

    pub fn token_not_found(id: &TokenId) -> Self {
        Self::NotFound {
            kind: EntityKind::Token,
            id: id.entity_id(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::NotAssociated { .. } => ErrorKind::NotAssociated,
            Self::AlreadyAssociated { .. } => ErrorKind::AlreadyAssociated,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::NoMintAuthority(_) => ErrorKind::NoMintAuthority,
            Self::SupplyCapExceeded { .. } => ErrorKind::SupplyCapExceeded,
            Self::Unbalanced { .. } => ErrorKind::Unbalanced,
            Self::MissingSignature(_) => ErrorKind::MissingSignature,
            Self::InvalidAmount(_) => ErrorKind::InvalidAmount,
            Self::InvalidMessage(_) => ErrorKind::InvalidMessage,
            Self::Overflow => ErrorKind::Overflow,
            Self::TransferFinalized { .. } => ErrorKind::TransferFinalized,
        }
    }

    /// Convert error to u64 error code
    pub fn to_code(&self) -> u64 {
        match self.kind() {
            ErrorKind::NotFound => LEDGER_ERROR_NOT_FOUND,
            ErrorKind::InsufficientFunds => LEDGER_ERROR_INSUFFICIENT_FUNDS,
            ErrorKind::NotAssociated => LEDGER_ERROR_NOT_ASSOCIATED,
            ErrorKind::AlreadyAssociated => LEDGER_ERROR_ALREADY_ASSOCIATED,
            ErrorKind::InvalidConfig => LEDGER_ERROR_INVALID_CONFIG,
            ErrorKind::NoMintAuthority => LEDGER_ERROR_NO_MINT_AUTHORITY,
            ErrorKind::SupplyCapExceeded => LEDGER_ERROR_SUPPLY_CAP_EXCEEDED,
            ErrorKind::Unbalanced => LEDGER_ERROR_UNBALANCED,
            ErrorKind::MissingSignature => LEDGER_ERROR_MISSING_SIGNATURE,
            ErrorKind::InvalidAmount => LEDGER_ERROR_INVALID_AMOUNT,
            ErrorKind::InvalidMessage => LEDGER_ERROR_INVALID_MESSAGE,
            ErrorKind::Overflow => LEDGER_ERROR_OVERFLOW,
            ErrorKind::TransferFinalized => LEDGER_ERROR_TRANSFER_FINALIZED,
            // Not produced by LedgerError::kind
            ErrorKind::NoSnapshot => u64::MAX,
        }
    }

    /// Whether callers may treat the error as success
    pub fn is_tolerated(&self) -> bool {
        matches!(self, Self::AlreadyAssociated { .. })
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
