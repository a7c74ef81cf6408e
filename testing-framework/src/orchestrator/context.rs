//! Per-scenario state shared between steps

use super::error::{ScenarioError, ScenarioResult};
use indexmap::IndexMap;
use ledger_common::{AccountId, PendingTransfer, TokenId, TopicId};

/// Everything one scenario remembers between steps
///
/// Created fresh for every scenario; nothing is shared across scenarios.
#[derive(Debug, Default)]
pub struct ScenarioContext {
    accounts: IndexMap<String, AccountId>,
    tokens: IndexMap<String, TokenId>,
    active_token: Option<TokenId>,
    active_topic: Option<TopicId>,
    subscription: Option<u64>,
    pending: Option<PendingTransfer>,
    snapshots: IndexMap<String, u64>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_account(&mut self, alias: impl Into<String>, id: AccountId) {
        self.accounts.insert(alias.into(), id);
    }

    pub fn lookup_account(&self, alias: &str) -> Option<AccountId> {
        self.accounts.get(alias).copied()
    }

    pub fn account(&self, alias: &str) -> ScenarioResult<AccountId> {
        self.lookup_account(alias)
            .ok_or_else(|| ScenarioError::UnknownAlias(alias.to_string()))
    }

    /// Alias bound to `id`, if any
    pub fn alias_of(&self, id: &AccountId) -> Option<&str> {
        self.accounts
            .iter()
            .find(|(_, bound)| *bound == id)
            .map(|(alias, _)| alias.as_str())
    }

    pub fn is_bound(&self, id: &AccountId) -> bool {
        self.alias_of(id).is_some()
    }

    /// Bound aliases in binding order
    pub fn accounts(&self) -> impl Iterator<Item = (&str, &AccountId)> {
        self.accounts.iter().map(|(alias, id)| (alias.as_str(), id))
    }

    /// Register a token and make it the active one
    pub fn bind_token(&mut self, alias: impl Into<String>, id: TokenId) {
        self.tokens.insert(alias.into(), id);
        self.active_token = Some(id);
    }

    pub fn token(&self, alias: &str) -> ScenarioResult<TokenId> {
        self.tokens
            .get(alias)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownToken(alias.to_string()))
    }

    pub fn active_token(&self) -> ScenarioResult<TokenId> {
        self.active_token.ok_or(ScenarioError::NoActiveToken)
    }

    pub fn set_active_topic(&mut self, topic: TopicId) {
        self.active_topic = Some(topic);
        self.subscription = None;
    }

    pub fn active_topic(&self) -> ScenarioResult<TopicId> {
        self.active_topic.ok_or(ScenarioError::NoActiveTopic)
    }

    /// Remember the first sequence number a subscriber should see
    pub fn subscribe(&mut self, from_sequence: u64) {
        self.subscription = Some(from_sequence);
    }

    pub fn subscription(&self) -> ScenarioResult<u64> {
        self.subscription.ok_or(ScenarioError::NotSubscribed)
    }

    /// Store a freshly built transfer, returning the one it replaces
    pub fn set_pending(&mut self, pending: PendingTransfer) -> Option<PendingTransfer> {
        self.pending.replace(pending)
    }

    pub fn pending_mut(&mut self) -> ScenarioResult<&mut PendingTransfer> {
        self.pending.as_mut().ok_or(ScenarioError::NoPendingTransfer)
    }

    /// Remove the pending transfer for submission
    pub fn take_pending(&mut self) -> ScenarioResult<PendingTransfer> {
        self.pending.take().ok_or(ScenarioError::NoPendingTransfer)
    }

    pub fn capture(&mut self, alias: impl Into<String>, hbar_balance: u64) {
        self.snapshots.insert(alias.into(), hbar_balance);
    }

    pub fn snapshot(&self, alias: &str) -> ScenarioResult<u64> {
        self.snapshots
            .get(alias)
            .copied()
            .ok_or_else(|| ScenarioError::NoSnapshot(alias.to_string()))
    }
}
