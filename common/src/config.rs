use serde::{Deserialize, Serialize};

// 1 HBAR = 10^8 tinybars
pub const TINYBARS_PER_HBAR: u64 = 100_000_000;

// Flat fee charged to the payer of every transfer and topic message
pub const DEFAULT_TRANSACTION_FEE: u64 = 100_000;

// Entity numbers below this are reserved for system accounts
pub const FIRST_USER_ENTITY_NUM: u64 = 1001;

pub const MAX_TOKEN_DECIMALS: u8 = 18;
pub const MAX_TOKEN_NAME_LEN: usize = 100;
pub const MAX_TOKEN_SYMBOL_LEN: usize = 100;

// Maximum size of a single topic message in bytes
pub const MAX_TOPIC_MESSAGE_SIZE: usize = 1024;

/// Runtime parameters of a ledger instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Fee charged to the payer of a transaction, in tinybars
    pub transaction_fee: u64,
    /// First entity number handed out by the id allocator
    pub first_entity_num: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            transaction_fee: DEFAULT_TRANSACTION_FEE,
            first_entity_num: FIRST_USER_ENTITY_NUM,
        }
    }
}
