//! Assertion modes shared by the orchestrator and the scenario DSL
//!
//! - `eq`: exact value
//! - `within {target, tolerance}`: inclusive range around a target
//! - `compare {gte|lte|gt|lt}`: one-sided bound

use crate::numbers::u64_from_string_or_number;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Balance assertion modes
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum BalanceExpect {
    /// Exact equality
    Eq {
        #[serde(deserialize_with = "u64_from_string_or_number")]
        eq: u64,
    },

    /// Within tolerance range
    Within { within: Tolerance },

    /// Comparison operator
    Compare { compare: CompareOp },
}

/// Tolerance specification for approximate assertions
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Tolerance {
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub target: u64,

    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub tolerance: u64,
}

/// Comparison operators for balance assertions
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CompareOp {
    Gte {
        #[serde(deserialize_with = "u64_from_string_or_number")]
        gte: u64,
    },
    Lte {
        #[serde(deserialize_with = "u64_from_string_or_number")]
        lte: u64,
    },
    Gt {
        #[serde(deserialize_with = "u64_from_string_or_number")]
        gt: u64,
    },
    Lt {
        #[serde(deserialize_with = "u64_from_string_or_number")]
        lt: u64,
    },
}

impl BalanceExpect {
    pub fn exactly(value: u64) -> Self {
        Self::Eq { eq: value }
    }

    pub fn within(target: u64, tolerance: u64) -> Self {
        Self::Within {
            within: Tolerance { target, tolerance },
        }
    }

    pub fn gte(value: u64) -> Self {
        Self::Compare {
            compare: CompareOp::Gte { gte: value },
        }
    }

    pub fn lt(value: u64) -> Self {
        Self::Compare {
            compare: CompareOp::Lt { lt: value },
        }
    }

    /// Check `actual`, returning a description of what held or what failed
    pub fn check(&self, actual: u64) -> Result<String, String> {
        match self {
            Self::Eq { eq } => {
                if actual != *eq {
                    return Err(format!("expected {}, got {}", eq, actual));
                }
                Ok(format!("equals {}", eq))
            }
            Self::Within { within } => {
                let min = within.target.saturating_sub(within.tolerance);
                let max = within.target.saturating_add(within.tolerance);
                if actual < min || actual > max {
                    return Err(format!(
                        "expected {} ± {}, got {} (range: {}-{})",
                        within.target, within.tolerance, actual, min, max
                    ));
                }
                Ok(format!("within {} ± {}", within.target, within.tolerance))
            }
            Self::Compare { compare } => match compare {
                CompareOp::Gte { gte } if actual < *gte => Err(format!("{} < {}", actual, gte)),
                CompareOp::Gte { gte } => Ok(format!(">= {}", gte)),
                CompareOp::Lte { lte } if actual > *lte => Err(format!("{} > {}", actual, lte)),
                CompareOp::Lte { lte } => Ok(format!("<= {}", lte)),
                CompareOp::Gt { gt } if actual <= *gt => Err(format!("{} <= {}", actual, gt)),
                CompareOp::Gt { gt } => Ok(format!("> {}", gt)),
                CompareOp::Lt { lt } if actual >= *lt => Err(format!("{} >= {}", actual, lt)),
                CompareOp::Lt { lt } => Ok(format!("< {}", lt)),
            },
        }
    }
}

/// Token properties that `assert_token` can inspect
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TokenField {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    MaxSupply,
    SupplyType,
    Treasury,
    MintAuthority,
}

impl TokenField {
    /// Fields whose value is an account, so expectations may name an alias
    pub fn is_account(&self) -> bool {
        matches!(self, Self::Treasury | Self::MintAuthority)
    }
}
