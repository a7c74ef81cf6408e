// File: testing-framework/src/orchestrator/mod.rs
//
// Scenario Orchestrator
//
// One operation per scenario step kind, executed against a single Ledger and
// a per-scenario ScenarioContext. Ledger errors surface unchanged; the only
// swallowed error is AlreadyAssociated inside associate_and_fund.

/// Balance and token-field assertion modes
pub mod assertions;
/// Per-scenario aliases, pending transfer and snapshots
pub mod context;
/// Orchestrator error type
pub mod error;
/// Alias-based step inputs
pub mod inputs;

pub use assertions::{BalanceExpect, CompareOp, TokenField, Tolerance};
pub use context::ScenarioContext;
pub use error::{ScenarioError, ScenarioResult};
pub use inputs::{AssetRef, TokenSpec, TransferLeg};

use ledger_common::{
    AccountId, Asset, Ledger, LedgerError, LedgerState, PendingTransfer, TokenConfig, TokenId,
    TopicId, TopicMessage, TransferBuilder, TransferEntry, TransferReceipt,
};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Drives one scenario against one ledger
///
/// The first configured account is the operator: it funds top-ups and pays
/// the fees of harness-initiated transfers.
///
/// # Example
///
/// ```rust
/// use ledger_common::LedgerBuilder;
/// use ledger_testing_framework::orchestrator::{BalanceExpect, Orchestrator};
///
/// let ledger = LedgerBuilder::new()
///     .with_allocated_account(10_000_000_000)
///     .build()
///     .unwrap();
/// let configured = ledger.account_ids();
/// let mut orchestrator = Orchestrator::new(ledger, configured).unwrap();
///
/// orchestrator.ensure_account_funded("first", 1_000_000_000).unwrap();
/// orchestrator.ensure_account_funded("second", 500).unwrap();
/// orchestrator
///     .assert_balance("second", &"hbar".into(), &BalanceExpect::exactly(500))
///     .unwrap();
/// ```
pub struct Orchestrator {
    ledger: Ledger,
    operator: AccountId,
    configured: Vec<AccountId>,
    context: ScenarioContext,
}

impl Orchestrator {
    /// Create an orchestrator over `ledger` with its configured accounts in order
    pub fn new(ledger: Ledger, configured: Vec<AccountId>) -> ScenarioResult<Self> {
        let operator = *configured.first().ok_or_else(|| {
            ScenarioError::InvalidStep("at least one configured account is required".to_string())
        })?;
        ledger.get_hbar_balance(&operator)?;

        Ok(Self {
            ledger,
            operator,
            configured,
            context: ScenarioContext::new(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn context(&self) -> &ScenarioContext {
        &self.context
    }

    pub fn operator(&self) -> AccountId {
        self.operator
    }

    /// Bind an alias to a known account (genesis names)
    pub fn bind_account(&mut self, alias: &str, account: AccountId) -> ScenarioResult<()> {
        self.ledger.get_hbar_balance(&account)?;
        self.context.bind_account(alias, account);
        Ok(())
    }

    // ===== Accounts =====

    /// Bind `alias` to an account holding at least `min_hbar` tinybars
    ///
    /// Unknown aliases take the next configured account nobody is bound to,
    /// or a fresh zero-balance account once the list is exhausted. A
    /// shortfall is covered by a transfer from the operator. Account
    /// creation and top-up commit together, and the alias is bound only
    /// once both have succeeded.
    pub fn ensure_account_funded(
        &mut self,
        alias: &str,
        min_hbar: u64,
    ) -> ScenarioResult<AccountId> {
        let bound = self.context.lookup_account(alias);
        let candidate = bound.or_else(|| self.next_unused_configured());
        let operator = self.operator;

        let (account, topped_up) = self.ledger.transact(|state| -> ScenarioResult<_> {
            let account = match candidate {
                Some(account) => account,
                None => state.create_account(0)?,
            };

            let balance = state.get_hbar_balance(&account)?;
            if balance >= min_hbar {
                return Ok((account, 0));
            }
            if account == operator {
                return Err(LedgerError::InsufficientFunds {
                    account,
                    asset: Asset::Hbar,
                    need: min_hbar,
                    have: balance,
                }
                .into());
            }

            let shortfall = min_hbar - balance;
            let delta = i64::try_from(shortfall).map_err(|_| LedgerError::Overflow)?;
            let mut pending = TransferBuilder::new()
                .hbar(operator, -delta)
                .hbar(account, delta)
                .build()?;
            state.submit_transfer(&mut pending, &operator)?;
            Ok((account, shortfall))
        })?;

        if bound.is_none() {
            self.context.bind_account(alias, account);
            info!("Bound '{}' to account {}", alias, account);
        }
        if topped_up > 0 {
            info!("Topped up '{}' by {} tinybars", alias, topped_up);
        }
        Ok(account)
    }

    /// Create a fresh account outside the configured list
    ///
    /// Fails with `AliasInUse` when `alias` is already bound.
    pub fn create_account(&mut self, alias: &str, initial_hbar: u64) -> ScenarioResult<AccountId> {
        if let Some(account) = self.context.lookup_account(alias) {
            return Err(ScenarioError::AliasInUse {
                alias: alias.to_string(),
                account,
            });
        }

        let account = self.ledger.create_account(initial_hbar)?;
        self.context.bind_account(alias, account);
        info!("Created '{}' as {}", alias, account);
        Ok(account)
    }

    fn next_unused_configured(&self) -> Option<AccountId> {
        self.configured
            .iter()
            .find(|account| !self.context.is_bound(account))
            .copied()
    }

    // ===== Tokens =====

    /// Create a token and make it the active one
    pub fn create_token(&mut self, alias: &str, spec: &TokenSpec) -> ScenarioResult<TokenId> {
        let treasury = self.context.account(&spec.treasury)?;

        let mut config = TokenConfig::new(spec.name.clone(), spec.symbol.clone(), treasury)
            .with_decimals(spec.decimals)
            .with_initial_supply(spec.initial_supply);
        if let Some(max_supply) = spec.max_supply {
            config = config.with_max_supply(max_supply);
        }
        if spec.mintable {
            config = config.with_mint_authority(treasury);
        }

        let token = self.ledger.create_token(config)?;
        self.context.bind_token(alias, token);
        info!("Created token '{}' ({}) as {}", alias, spec.symbol, token);
        Ok(token)
    }

    /// Associate with the active token without tolerating re-association
    pub fn associate(&mut self, alias: &str) -> ScenarioResult<()> {
        let account = self.context.account(alias)?;
        let token = self.context.active_token()?;
        self.ledger.associate(&account, &token)?;
        Ok(())
    }

    /// Associate with the active token and hold exactly `amount` units of it
    ///
    /// Association and the reconciling transfer commit together.
    pub fn associate_and_fund(&mut self, alias: &str, amount: u64) -> ScenarioResult<()> {
        let account = self.context.account(alias)?;
        let token = self.context.active_token()?;
        let operator = self.operator;

        self.ledger.transact(|state| -> ScenarioResult<()> {
            match state.associate(&account, &token) {
                Ok(()) => {}
                Err(e) if e.is_tolerated() => warn!("{}", e),
                Err(e) => return Err(e.into()),
            }
            reconcile_token_balance(state, operator, account, token, amount)
        })
    }

    /// Mint on the active token, returning the new total supply
    pub fn mint(&mut self, amount: u64) -> ScenarioResult<u64> {
        let token = self.context.active_token()?;
        Ok(self.ledger.mint(&token, amount)?)
    }

    // ===== Transfers =====

    /// Build a transfer and store it as the pending one
    pub fn build_transfer(&mut self, legs: &[TransferLeg]) -> ScenarioResult<()> {
        let entries = legs
            .iter()
            .map(|leg| {
                Ok(TransferEntry {
                    account: self.context.account(&leg.account)?,
                    asset: self.resolve_asset(&leg.asset)?,
                    delta: leg.delta,
                })
            })
            .collect::<ScenarioResult<Vec<_>>>()?;

        let pending = PendingTransfer::build(entries)?;
        if self.context.set_pending(pending).is_some() {
            warn!("Discarding a transfer that was built but never submitted");
        }
        Ok(())
    }

    pub fn sign_pending(&mut self, alias: &str) -> ScenarioResult<()> {
        let account = self.context.account(alias)?;
        self.context.pending_mut()?.sign(account)?;
        Ok(())
    }

    /// Submit the pending transfer with `payer_alias` paying the fee
    ///
    /// The payer's HBAR balance is captured first, and the transfer is
    /// discarded whatever the outcome.
    pub fn submit_pending(&mut self, payer_alias: &str) -> ScenarioResult<TransferReceipt> {
        let payer = self.context.account(payer_alias)?;
        let mut pending = self.context.take_pending()?;

        self.capture_balance(payer_alias)?;
        let receipt = self.ledger.submit(&mut pending, &payer)?;
        info!(
            "Transfer with {} entries committed, fee {} paid by '{}'",
            receipt.entries.len(),
            receipt.fee_charged,
            payer_alias
        );
        Ok(receipt)
    }

    // ===== Assertions =====

    /// Record the current HBAR balance of `alias`
    pub fn capture_balance(&mut self, alias: &str) -> ScenarioResult<u64> {
        let account = self.context.account(alias)?;
        let balance = self.ledger.get_hbar_balance(&account)?;
        self.context.capture(alias, balance);
        Ok(balance)
    }

    /// Compare one property of the active token with `expected`
    ///
    /// Account-valued fields accept an alias or an entity id; absent values
    /// read as `none`.
    pub fn assert_token_field(&self, field: TokenField, expected: &str) -> ScenarioResult<()> {
        let token = self.context.active_token()?;
        let info = self.ledger.get_info(&token)?;

        let actual = match field {
            TokenField::Name => info.name.clone(),
            TokenField::Symbol => info.symbol.clone(),
            TokenField::Decimals => info.decimals.to_string(),
            TokenField::TotalSupply => info.total_supply.to_string(),
            TokenField::MaxSupply => info
                .max_supply()
                .map_or_else(|| "none".to_string(), |max| max.to_string()),
            TokenField::SupplyType => info.supply_policy.name().to_string(),
            TokenField::Treasury => info.treasury.to_string(),
            TokenField::MintAuthority => info
                .mint_authority
                .map_or_else(|| "none".to_string(), |authority| authority.to_string()),
        };

        let expected = match self.context.lookup_account(expected) {
            Some(account) if field.is_account() => account.to_string(),
            _ => expected.to_string(),
        };

        if actual != expected {
            return Err(ScenarioError::AssertionFailed(format!(
                "token {} {}: expected '{}', got '{}'",
                token, field, expected, actual
            )));
        }
        Ok(())
    }

    /// Check the balance of `alias` in `asset`, returning what held
    pub fn assert_balance(
        &self,
        alias: &str,
        asset: &AssetRef,
        expect: &BalanceExpect,
    ) -> ScenarioResult<String> {
        let account = self.context.account(alias)?;
        let actual = match self.resolve_asset(asset)? {
            Asset::Hbar => self.ledger.get_hbar_balance(&account)?,
            Asset::Token(token) => self.ledger.get_token_balance(&account, &token)?,
        };

        expect.check(actual).map_err(|reason| {
            ScenarioError::AssertionFailed(format!(
                "{} balance of '{}': {}",
                String::from(asset.clone()),
                alias,
                reason
            ))
        })
    }

    /// The HBAR balance of `alias` must be below its last snapshot
    pub fn assert_fee_was_paid(&self, alias: &str) -> ScenarioResult<()> {
        let before = self.context.snapshot(alias)?;
        let account = self.context.account(alias)?;
        let after = self.ledger.get_hbar_balance(&account)?;

        if after >= before {
            return Err(ScenarioError::AssertionFailed(format!(
                "'{}' paid no fee: balance {} is not below snapshot {}",
                alias, after, before
            )));
        }
        Ok(())
    }

    // ===== Topics =====

    /// Create a topic and make it the active one
    pub fn create_topic(
        &mut self,
        memo: &str,
        submit_key: Option<&str>,
    ) -> ScenarioResult<TopicId> {
        let submit_key = submit_key
            .map(|alias| self.context.account(alias))
            .transpose()?;
        let topic = self.ledger.create_topic(memo, submit_key)?;
        self.context.set_active_topic(topic);
        info!("Created topic {}", topic);
        Ok(topic)
    }

    /// Publish on the active topic; `signers` sign in addition to the payer
    pub fn publish_message(
        &mut self,
        payer_alias: &str,
        signers: &[String],
        message: &str,
    ) -> ScenarioResult<TopicMessage> {
        let topic = self.context.active_topic()?;
        let payer = self.context.account(payer_alias)?;
        let signatures = signers
            .iter()
            .map(|alias| self.context.account(alias))
            .collect::<ScenarioResult<BTreeSet<_>>>()?;

        self.capture_balance(payer_alias)?;
        Ok(self
            .ledger
            .submit_message(&topic, &payer, &signatures, message)?)
    }

    /// Open a subscription on the active topic
    pub fn subscribe_topic(&mut self, from_sequence: Option<u64>) -> ScenarioResult<()> {
        self.context.active_topic()?;
        self.context.subscribe(from_sequence.unwrap_or(1));
        Ok(())
    }

    /// A message with these contents must have reached the subscription
    pub fn assert_message_received(&self, message: &str) -> ScenarioResult<()> {
        let topic = self.context.active_topic()?;
        let from_sequence = self.context.subscription()?;
        let received = self.ledger.topic_messages(&topic, from_sequence)?;

        if !received.iter().any(|m| m.contents == message) {
            return Err(ScenarioError::AssertionFailed(format!(
                "message '{}' not received on topic {} ({} messages since #{})",
                message,
                topic,
                received.len(),
                from_sequence
            )));
        }
        Ok(())
    }

    fn resolve_asset(&self, asset: &AssetRef) -> ScenarioResult<Asset> {
        Ok(match asset {
            AssetRef::Hbar => Asset::Hbar,
            AssetRef::ActiveToken => Asset::Token(self.context.active_token()?),
            AssetRef::Token(alias) => Asset::Token(self.context.token(alias)?),
        })
    }
}

/// Move units between `account` and the treasury until it holds `target`
///
/// The debited side signs and `operator` pays the fee.
fn reconcile_token_balance(
    state: &mut LedgerState,
    operator: AccountId,
    account: AccountId,
    token: TokenId,
    target: u64,
) -> ScenarioResult<()> {
    let current = state.get_token_balance(&account, &token)?;
    if current == target {
        return Ok(());
    }

    let treasury = *state.token(&token)?.treasury();
    if account == treasury {
        return Err(ScenarioError::InvalidStep(format!(
            "treasury {} holds {} units of {} and cannot be reconciled to {}",
            account, current, token, target
        )));
    }

    let (from, to, amount) = if target > current {
        (treasury, account, target - current)
    } else {
        (account, treasury, current - target)
    };
    let amount = i64::try_from(amount).map_err(|_| LedgerError::Overflow)?;

    let mut pending = TransferBuilder::new()
        .token(token, from, -amount)
        .token(token, to, amount)
        .build()?;
    pending.sign(from)?;
    state.submit_transfer(&mut pending, &operator)?;

    debug!("Reconciled {} to {} units of {}", account, target, token);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_common::config::TINYBARS_PER_HBAR;
    use ledger_common::{ErrorKind, LedgerBuilder};

    const FEE: u64 = 100_000;

    fn orchestrator(balances: &[u64]) -> Orchestrator {
        let builder = balances.iter().fold(
            LedgerBuilder::new().with_transaction_fee(FEE),
            |builder, balance| builder.with_allocated_account(*balance),
        );
        let ledger = builder.build().unwrap();
        let configured = ledger.account_ids();
        Orchestrator::new(ledger, configured).unwrap()
    }

    fn hbar(amount: u64) -> u64 {
        amount * TINYBARS_PER_HBAR
    }

    #[test]
    fn test_requires_operator() {
        let result = Orchestrator::new(Ledger::default(), Vec::new());
        assert!(matches!(result, Err(ScenarioError::InvalidStep(_))));
    }

    #[test]
    fn test_ensure_account_funded_binds_in_order() {
        let mut orch = orchestrator(&[hbar(1000), hbar(5)]);
        let first = orch.ensure_account_funded("first", hbar(10)).unwrap();
        let second = orch.ensure_account_funded("second", hbar(10)).unwrap();

        assert_eq!(first, orch.operator());
        assert_ne!(first, second);
        assert_eq!(orch.ledger().get_hbar_balance(&second).unwrap(), hbar(10));
        assert_eq!(
            orch.ledger().get_hbar_balance(&first).unwrap(),
            hbar(1000) - hbar(5) - FEE
        );
    }

    #[test]
    fn test_ensure_account_funded_creates_when_exhausted() {
        let mut orch = orchestrator(&[hbar(1000)]);
        orch.ensure_account_funded("first", 0).unwrap();
        let extra = orch.ensure_account_funded("extra", hbar(1)).unwrap();

        assert_eq!(orch.ledger().get_hbar_balance(&extra).unwrap(), hbar(1));
        assert_eq!(orch.context().accounts().count(), 2);
    }

    #[test]
    fn test_operator_cannot_fund_itself() {
        let mut orch = orchestrator(&[hbar(1)]);
        let err = orch.ensure_account_funded("first", hbar(10)).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InsufficientFunds));
    }

    #[test]
    fn test_failed_top_up_creates_and_binds_nothing() {
        let mut orch = orchestrator(&[100]);
        orch.ensure_account_funded("first", 0).unwrap();
        let before = orch.ledger().snapshot();

        let err = orch.ensure_account_funded("fresh", 1_000).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InsufficientFunds));
        assert_eq!(orch.ledger().snapshot(), before);
        assert!(orch.context().lookup_account("fresh").is_none());

        // Funding the operator lets the same alias succeed afterwards
        orch.ledger().credit_hbar(&orch.operator(), hbar(1)).unwrap();
        let fresh = orch.ensure_account_funded("fresh", 1_000).unwrap();
        assert_eq!(orch.ledger().get_hbar_balance(&fresh).unwrap(), 1_000);
        assert_eq!(orch.context().lookup_account("fresh"), Some(fresh));
    }

    #[test]
    fn test_failed_top_up_leaves_configured_account_unbound() {
        let mut orch = orchestrator(&[100, 0]);
        orch.ensure_account_funded("first", 0).unwrap();

        orch.ensure_account_funded("second", 1_000).unwrap_err();
        assert!(orch.context().lookup_account("second").is_none());
        assert_eq!(orch.ledger().account_ids().len(), 2);
    }

    #[test]
    fn test_create_account_rejects_bound_alias() {
        let mut orch = orchestrator(&[hbar(1000)]);
        let first = orch.ensure_account_funded("first", 0).unwrap();
        let before = orch.ledger().snapshot();

        let err = orch.create_account("first", 10).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::AliasInUse { ref alias, account } if alias == "first" && account == first
        ));
        assert_eq!(orch.ledger().snapshot(), before);
        assert_eq!(orch.context().lookup_account("first"), Some(first));

        let other = orch.create_account("other", 10).unwrap();
        assert_ne!(other, first);
    }

    #[test]
    fn test_failed_associate_and_fund_keeps_account_unassociated() {
        let mut orch = orchestrator(&[hbar(1000), hbar(1000)]);
        orch.ensure_account_funded("treasury", 0).unwrap();
        let holder = orch.ensure_account_funded("holder", 0).unwrap();
        let token = orch
            .create_token(
                "htt",
                &TokenSpec::new("Test Token", "HTT", "treasury").with_initial_supply(10),
            )
            .unwrap();
        let before = orch.ledger().snapshot();

        let err = orch.associate_and_fund("holder", 50).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InsufficientFunds));
        assert_eq!(orch.ledger().snapshot(), before);
        assert!(!orch.ledger().is_associated(&holder, &token).unwrap());

        orch.associate_and_fund("holder", 10).unwrap();
        assert!(orch.ledger().is_associated(&holder, &token).unwrap());
    }

    #[test]
    fn test_associate_and_fund_needs_operator_fee() {
        // Operator holds less than one fee
        let mut orch = orchestrator(&[FEE - 1, hbar(1000)]);
        orch.ensure_account_funded("first", 0).unwrap();
        let holder = orch.ensure_account_funded("holder", 0).unwrap();
        let token = orch
            .create_token(
                "htt",
                &TokenSpec::new("Test Token", "HTT", "first").with_initial_supply(100),
            )
            .unwrap();

        let err = orch.associate_and_fund("holder", 5).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InsufficientFunds));
        assert!(!orch.ledger().is_associated(&holder, &token).unwrap());
    }

    #[test]
    fn test_associate_and_fund_reconciles_both_ways() {
        let mut orch = orchestrator(&[hbar(1000), hbar(1000)]);
        orch.ensure_account_funded("treasury", 0).unwrap();
        orch.ensure_account_funded("holder", 0).unwrap();
        orch.create_token(
            "htt",
            &TokenSpec::new("Test Token", "HTT", "treasury").with_initial_supply(1000),
        )
        .unwrap();

        orch.associate_and_fund("holder", 300).unwrap();
        orch.assert_balance("holder", &AssetRef::ActiveToken, &BalanceExpect::exactly(300))
            .unwrap();

        // Second call tolerates the existing association and moves units back
        orch.associate_and_fund("holder", 100).unwrap();
        orch.assert_balance("holder", &AssetRef::ActiveToken, &BalanceExpect::exactly(100))
            .unwrap();
        orch.assert_balance("treasury", &"htt".into(), &BalanceExpect::exactly(900))
            .unwrap();
    }

    #[test]
    fn test_plain_associate_is_not_tolerant() {
        let mut orch = orchestrator(&[hbar(1000), hbar(1000)]);
        orch.ensure_account_funded("treasury", 0).unwrap();
        orch.ensure_account_funded("holder", 0).unwrap();
        orch.create_token("htt", &TokenSpec::new("Test Token", "HTT", "treasury"))
            .unwrap();

        orch.associate("holder").unwrap();
        let err = orch.associate("holder").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::AlreadyAssociated));
    }

    #[test]
    fn test_transfer_requires_signature_then_succeeds() {
        let mut orch = orchestrator(&[hbar(1000), hbar(1000), hbar(1000)]);
        orch.ensure_account_funded("payer", 0).unwrap();
        orch.ensure_account_funded("alice", 0).unwrap();
        orch.ensure_account_funded("bob", 0).unwrap();

        let legs = vec![
            TransferLeg::new("alice", "hbar", -(hbar(10) as i64)),
            TransferLeg::new("bob", "hbar", hbar(10) as i64),
        ];

        orch.build_transfer(&legs).unwrap();
        let err = orch.submit_pending("payer").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingSignature));
        // Submission consumed the transfer
        assert!(matches!(
            orch.submit_pending("payer"),
            Err(ScenarioError::NoPendingTransfer)
        ));

        orch.build_transfer(&legs).unwrap();
        orch.sign_pending("alice").unwrap();
        orch.submit_pending("payer").unwrap();
        orch.assert_balance("bob", &AssetRef::Hbar, &BalanceExpect::exactly(hbar(1010)))
            .unwrap();
        orch.assert_fee_was_paid("payer").unwrap();
    }

    #[test]
    fn test_fee_assertion_needs_snapshot() {
        let mut orch = orchestrator(&[hbar(1000)]);
        orch.ensure_account_funded("first", 0).unwrap();

        let err = orch.assert_fee_was_paid("first").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NoSnapshot));

        orch.capture_balance("first").unwrap();
        assert!(orch.assert_fee_was_paid("first").unwrap_err().is_assertion());
    }

    #[test]
    fn test_token_fields() {
        let mut orch = orchestrator(&[hbar(1000)]);
        orch.ensure_account_funded("first", 0).unwrap();
        orch.create_token(
            "htt",
            &TokenSpec::new("Test Token", "HTT", "first")
                .with_decimals(2)
                .with_initial_supply(500)
                .with_max_supply(500),
        )
        .unwrap();

        orch.assert_token_field(TokenField::Name, "Test Token").unwrap();
        orch.assert_token_field(TokenField::Decimals, "2").unwrap();
        orch.assert_token_field(TokenField::SupplyType, "finite").unwrap();
        orch.assert_token_field(TokenField::MaxSupply, "500").unwrap();
        orch.assert_token_field(TokenField::Treasury, "first").unwrap();
        orch.assert_token_field(TokenField::MintAuthority, "none").unwrap();
        assert!(orch
            .assert_token_field(TokenField::Symbol, "XYZ")
            .unwrap_err()
            .is_assertion());
    }

    #[test]
    fn test_topic_round_trip() {
        let mut orch = orchestrator(&[hbar(1000), hbar(1000)]);
        orch.ensure_account_funded("first", 0).unwrap();
        orch.ensure_account_funded("writer", 0).unwrap();

        assert!(matches!(
            orch.publish_message("first", &[], "hello"),
            Err(ScenarioError::NoActiveTopic)
        ));

        orch.create_topic("memo", Some("writer")).unwrap();
        orch.subscribe_topic(None).unwrap();

        let err = orch.publish_message("first", &[], "hello").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingSignature));

        orch.publish_message("first", &["writer".to_string()], "hello")
            .unwrap();
        orch.assert_message_received("hello").unwrap();
        assert!(orch.assert_message_received("bye").unwrap_err().is_assertion());
        orch.assert_fee_was_paid("first").unwrap();
    }
}
