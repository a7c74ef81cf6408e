//! Entity identifiers
//!
//! Accounts, tokens and topics share one `shard.realm.num` id space, allocated
//! from a single counter per ledger.

use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use strum::{AsRefStr, Display as StrumDisplay};
use thiserror::Error;

/// Error returned when an id or asset string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid entity id '{0}', expected <shard>.<realm>.<num>")]
pub struct EntityIdParseError(pub String);

/// Kind of entity stored in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Account,
    Token,
    Topic,
}

/// `shard.realm.num` identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Id in the default shard and realm
    pub const fn from_num(num: u64) -> Self {
        Self::new(0, 0, num)
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = EntityIdParseError;

    // Accepts "0.0.1001" or the bare entity number "1001"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || EntityIdParseError(s.to_string());
        let parts = s
            .trim()
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [num] => Ok(Self::from_num(*num)),
            [shard, realm, num] => Ok(Self::new(*shard, *realm, *num)),
            _ => Err(err()),
        }
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(SerdeError::custom)
    }
}

macro_rules! entity_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(EntityId);

        impl $name {
            pub const fn new(id: EntityId) -> Self {
                Self(id)
            }

            pub const fn from_num(num: u64) -> Self {
                Self(EntityId::from_num(num))
            }

            pub const fn entity_id(&self) -> EntityId {
                self.0
            }
        }

        impl From<EntityId> for $name {
            fn from(id: EntityId) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = EntityIdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

entity_newtype!(
    /// Account identifier
    AccountId
);
entity_newtype!(
    /// Fungible token identifier
    TokenId
);
entity_newtype!(
    /// Consensus topic identifier
    TopicId
);

/// Asset moved by a transfer entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Asset {
    /// Native currency, in tinybars
    Hbar,
    /// Fungible token, in the token's smallest unit
    Token(TokenId),
}

impl Asset {
    pub fn token(&self) -> Option<&TokenId> {
        match self {
            Self::Hbar => None,
            Self::Token(token) => Some(token),
        }
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hbar => f.write_str("hbar"),
            Self::Token(token) => write!(f, "token {}", token),
        }
    }
}

impl FromStr for Asset {
    type Err = EntityIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("hbar") {
            return Ok(Self::Hbar);
        }
        let id = s.trim().strip_prefix("token ").unwrap_or(s);
        id.parse().map(Self::Token)
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Hbar => serializer.serialize_str("hbar"),
            Self::Token(token) => serializer.collect_str(token),
        }
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(SerdeError::custom)
    }
}
