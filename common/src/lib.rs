//! Deterministic in-memory ledger
//!
//! Models the subset of a public ledger that the scenario harness exercises:
//! HBAR accounts, fungible tokens with supply policies, multi-party transfers
//! and consensus topics. Every mutating operation is applied under one write
//! lock and either fully commits or leaves the state untouched.
//!
//! ```rust
//! use ledger_common::{LedgerBuilder, TokenConfig, SupplyPolicy, TransferBuilder};
//!
//! let ledger = LedgerBuilder::new().build().unwrap();
//! let alice = ledger.create_account(1_000_000).unwrap();
//! let bob = ledger.create_account(0).unwrap();
//!
//! let token = ledger
//!     .create_token(TokenConfig::new("Test Token", "HTT", alice).with_initial_supply(500))
//!     .unwrap();
//! ledger.associate(&bob, &token).unwrap();
//!
//! let mut transfer = TransferBuilder::new()
//!     .token(token, alice, -200)
//!     .token(token, bob, 200)
//!     .build()
//!     .unwrap();
//! ledger.submit(&mut transfer, &alice).unwrap();
//!
//! assert_eq!(ledger.get_token_balance(&bob, &token).unwrap(), 200);
//! ```

#![warn(clippy::all)]

pub mod account;
pub mod config;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod state;
pub mod token;
pub mod topic;
pub mod transfer;

pub use account::Account;
pub use config::LedgerConfig;
pub use entity::{AccountId, Asset, EntityId, EntityKind, TokenId, TopicId};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::{Ledger, LedgerBuilder, LedgerSnapshot};
pub use state::LedgerState;
pub use token::{SupplyPolicy, Token, TokenConfig, TokenSnapshot};
pub use topic::{Topic, TopicMessage};
pub use transfer::{
    PendingTransfer, TransferBuilder, TransferEntry, TransferReceipt, TransferStatus,
};
