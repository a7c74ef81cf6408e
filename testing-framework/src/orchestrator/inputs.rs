//! Step inputs that refer to accounts and tokens by alias

use crate::numbers::{
    i64_from_string_or_number, option_u64_from_string_or_number, u64_from_string_or_number,
};
use serde::{Deserialize, Serialize};

/// Asset named by a scenario: `hbar`, `token` (the active token) or a token alias
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetRef {
    #[default]
    Hbar,
    ActiveToken,
    Token(String),
}

impl AssetRef {
    /// Alias of an explicitly named token
    pub fn token_alias(&self) -> Option<&str> {
        match self {
            Self::Token(alias) => Some(alias),
            Self::Hbar | Self::ActiveToken => None,
        }
    }
}

impl From<String> for AssetRef {
    fn from(value: String) -> Self {
        match value.as_str() {
            "hbar" => Self::Hbar,
            "token" => Self::ActiveToken,
            _ => Self::Token(value),
        }
    }
}

impl From<&str> for AssetRef {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AssetRef> for String {
    fn from(value: AssetRef) -> Self {
        match value {
            AssetRef::Hbar => "hbar".to_string(),
            AssetRef::ActiveToken => "token".to_string(),
            AssetRef::Token(alias) => alias,
        }
    }
}

/// Token creation parameters with the treasury given by alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub initial_supply: u64,
    /// Finite supply when present
    #[serde(
        default,
        deserialize_with = "option_u64_from_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_supply: Option<u64>,
    pub treasury: String,
    /// Gives the treasury mint authority
    #[serde(default)]
    pub mintable: bool,
}

impl TokenSpec {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        treasury: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: 0,
            initial_supply: 0,
            max_supply: None,
            treasury: treasury.into(),
            mintable: false,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_initial_supply(mut self, initial_supply: u64) -> Self {
        self.initial_supply = initial_supply;
        self
    }

    pub fn with_max_supply(mut self, max_supply: u64) -> Self {
        self.max_supply = Some(max_supply);
        self
    }

    pub fn mintable(mut self) -> Self {
        self.mintable = true;
        self
    }
}

/// One signed balance change of a transfer step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLeg {
    pub account: String,
    #[serde(default)]
    pub asset: AssetRef,
    #[serde(deserialize_with = "i64_from_string_or_number")]
    pub delta: i64,
}

impl TransferLeg {
    pub fn new(account: impl Into<String>, asset: impl Into<AssetRef>, delta: i64) -> Self {
        Self {
            account: account.into(),
            asset: asset.into(),
            delta,
        }
    }
}
