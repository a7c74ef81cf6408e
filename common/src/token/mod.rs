//! Fungible token definitions
//!
//! Lifecycle operations (create, associate, mint) live in [`registry`].

pub mod registry;

use serde::{Deserialize, Serialize};

use crate::entity::{AccountId, TokenId};

/// Supply policy of a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SupplyPolicy {
    /// No upper bound on total supply
    #[default]
    Infinite,
    /// Total supply may never exceed `max_supply`
    Finite { max_supply: u64 },
}

impl SupplyPolicy {
    pub fn max_supply(&self) -> Option<u64> {
        match self {
            Self::Infinite => None,
            Self::Finite { max_supply } => Some(*max_supply),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Infinite => "infinite",
            Self::Finite { .. } => "finite",
        }
    }
}

/// Parameters of a token creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    /// Decimal places (0-18)
    pub decimals: u8,
    /// Amount credited to the treasury at creation, in smallest units
    pub initial_supply: u64,
    pub supply_policy: SupplyPolicy,
    pub treasury: AccountId,
    /// Holder of the supply key; minting is impossible without one
    pub mint_authority: Option<AccountId>,
}

impl TokenConfig {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, treasury: AccountId) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: 0,
            initial_supply: 0,
            supply_policy: SupplyPolicy::Infinite,
            treasury,
            mint_authority: None,
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

    pub fn with_supply_policy(mut self, supply_policy: SupplyPolicy) -> Self {
        self.supply_policy = supply_policy;
        self
    }

    /// Shorthand for a finite supply policy
    pub fn with_max_supply(self, max_supply: u64) -> Self {
        self.with_supply_policy(SupplyPolicy::Finite { max_supply })
    }

    pub fn with_mint_authority(mut self, authority: AccountId) -> Self {
        self.mint_authority = Some(authority);
        self
    }
}

/// Token state held by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    id: TokenId,
    name: String,
    symbol: String,
    decimals: u8,
    supply_policy: SupplyPolicy,
    treasury: AccountId,
    mint_authority: Option<AccountId>,
    total_supply: u64,
}

impl Token {
    pub(crate) fn from_config(id: TokenId, config: TokenConfig) -> Self {
        Self {
            id,
            name: config.name,
            symbol: config.symbol,
            decimals: config.decimals,
            supply_policy: config.supply_policy,
            treasury: config.treasury,
            mint_authority: config.mint_authority,
            total_supply: config.initial_supply,
        }
    }

    pub fn id(&self) -> &TokenId {
        &self.id
    }

    pub fn treasury(&self) -> &AccountId {
        &self.treasury
    }

    pub fn supply_policy(&self) -> &SupplyPolicy {
        &self.supply_policy
    }

    pub fn mint_authority(&self) -> Option<&AccountId> {
        self.mint_authority.as_ref()
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub(crate) fn set_total_supply(&mut self, total_supply: u64) {
        self.total_supply = total_supply;
    }

    /// Read-only projection of every field
    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            token_id: self.id,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            supply_policy: self.supply_policy,
            treasury: self.treasury,
            mint_authority: self.mint_authority,
            total_supply: self.total_supply,
        }
    }
}

/// Token information returned by `get_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub token_id: TokenId,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub supply_policy: SupplyPolicy,
    pub treasury: AccountId,
    pub mint_authority: Option<AccountId>,
    pub total_supply: u64,
}

impl TokenSnapshot {
    pub fn max_supply(&self) -> Option<u64> {
        self.supply_policy.max_supply()
    }
}
