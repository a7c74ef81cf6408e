//! Token registry: creation, association and supply enforcement

use log::debug;

use crate::config::{MAX_TOKEN_DECIMALS, MAX_TOKEN_NAME_LEN, MAX_TOKEN_SYMBOL_LEN};
use crate::entity::{AccountId, TokenId};
use crate::error::{LedgerError, LedgerResult};
use crate::state::LedgerState;

use super::{SupplyPolicy, Token, TokenConfig, TokenSnapshot};

fn validate_config(config: &TokenConfig) -> LedgerResult<()> {
    let invalid = |reason: String| Err(LedgerError::InvalidConfig(reason));

    if config.name.trim().is_empty() {
        return invalid("token name cannot be empty".into());
    }
    if config.name.chars().count() > MAX_TOKEN_NAME_LEN {
        return invalid(format!("token name longer than {}", MAX_TOKEN_NAME_LEN));
    }
    if config.symbol.trim().is_empty() {
        return invalid("token symbol cannot be empty".into());
    }
    if config.symbol.chars().count() > MAX_TOKEN_SYMBOL_LEN {
        return invalid(format!("token symbol longer than {}", MAX_TOKEN_SYMBOL_LEN));
    }
    if config.decimals > MAX_TOKEN_DECIMALS {
        return invalid(format!(
            "decimals {} above maximum {}",
            config.decimals, MAX_TOKEN_DECIMALS
        ));
    }
    if let SupplyPolicy::Finite { max_supply } = config.supply_policy {
        if max_supply == 0 {
            return invalid("finite max supply must be positive".into());
        }
        if max_supply < config.initial_supply {
            return invalid(format!(
                "max supply {} below initial supply {}",
                max_supply, config.initial_supply
            ));
        }
    }
    Ok(())
}

impl LedgerState {
    /// Create a token and credit its initial supply to the treasury
    pub fn create_token(&mut self, config: TokenConfig) -> LedgerResult<TokenId> {
        validate_config(&config)?;
        self.account(&config.treasury)?;
        if let Some(authority) = &config.mint_authority {
            self.account(authority)?;
        }

        let id = TokenId::new(self.allocate_id()?);
        let treasury = config.treasury;
        let initial_supply = config.initial_supply;

        self.account_mut(&treasury)?
            .set_token_balance(id, initial_supply);
        self.tokens.insert(id, Token::from_config(id, config));

        debug!(
            "Created token {} with supply {} in treasury {}",
            id, initial_supply, treasury
        );
        Ok(id)
    }

    /// Associate an account with a token
    ///
    /// Re-associating signals `AlreadyAssociated` and leaves the state as is.
    pub fn associate(&mut self, account: &AccountId, token: &TokenId) -> LedgerResult<()> {
        self.token(token)?;
        if !self.account_mut(account)?.associate(*token) {
            return Err(LedgerError::AlreadyAssociated {
                account: *account,
                token: *token,
            });
        }

        debug!("Associated account {} with token {}", account, token);
        Ok(())
    }

    /// Mint new units into the treasury, returning the new total supply
    pub fn mint(&mut self, token: &TokenId, amount: u64) -> LedgerResult<u64> {
        let definition = self.token(token)?;
        if definition.mint_authority().is_none() {
            return Err(LedgerError::NoMintAuthority(*token));
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("mint amount must be positive".into()));
        }

        let new_supply = definition
            .total_supply()
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        if let Some(max) = definition.supply_policy().max_supply() {
            if new_supply > max {
                return Err(LedgerError::SupplyCapExceeded {
                    token: *token,
                    max,
                    would_have: new_supply,
                });
            }
        }

        let treasury = *definition.treasury();
        let treasury_balance = self
            .get_token_balance(&treasury, token)?
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        // Every check is done, apply both sides together
        self.account_mut(&treasury)?
            .set_token_balance(*token, treasury_balance);
        self.token_mut(token)?.set_total_supply(new_supply);

        debug!("Minted {} of token {}, supply now {}", amount, token, new_supply);
        Ok(new_supply)
    }

    pub fn get_info(&self, token: &TokenId) -> LedgerResult<TokenSnapshot> {
        self.token(token).map(Token::snapshot)
    }
}
