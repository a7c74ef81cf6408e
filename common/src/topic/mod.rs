//! Consensus topics
//!
//! Topics are ordered message logs. Every accepted message gets the next
//! sequence number and a running hash chaining it to all previous messages.

use log::debug;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeSet;

use crate::config::MAX_TOPIC_MESSAGE_SIZE;
use crate::entity::{AccountId, Asset, TopicId};
use crate::error::{LedgerError, LedgerResult};
use crate::state::LedgerState;

/// Message accepted by a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub topic: TopicId,
    /// 1-based, contiguous per topic
    pub sequence_number: u64,
    pub contents: String,
    pub payer: AccountId,
    /// Hex encoded running hash after this message
    pub running_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    memo: String,
    /// Account whose signature is required to publish, if any
    submit_key: Option<AccountId>,
    messages: Vec<TopicMessage>,
    running_hash: [u8; 32],
}

impl Topic {
    fn new(id: TopicId, memo: String, submit_key: Option<AccountId>) -> Self {
        Self {
            id,
            memo,
            submit_key,
            messages: Vec::new(),
            running_hash: [0u8; 32],
        }
    }

    pub fn id(&self) -> &TopicId {
        &self.id
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn submit_key(&self) -> Option<&AccountId> {
        self.submit_key.as_ref()
    }

    pub fn messages(&self) -> &[TopicMessage] {
        &self.messages
    }

    pub fn sequence_number(&self) -> u64 {
        self.messages.len() as u64
    }

    fn next_running_hash(&self, sequence_number: u64, contents: &str) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(self.running_hash);
        hasher.update(self.id.to_string().as_bytes());
        hasher.update(sequence_number.to_be_bytes());
        hasher.update(contents.as_bytes());
        hasher.finalize().into()
    }
}

fn validate_message(contents: &str) -> LedgerResult<()> {
    if contents.is_empty() {
        return Err(LedgerError::InvalidMessage("message is empty".into()));
    }
    if contents.len() > MAX_TOPIC_MESSAGE_SIZE {
        return Err(LedgerError::InvalidMessage(format!(
            "message of {} bytes exceeds {} bytes",
            contents.len(),
            MAX_TOPIC_MESSAGE_SIZE
        )));
    }
    Ok(())
}

impl LedgerState {
    pub fn create_topic(
        &mut self,
        memo: impl Into<String>,
        submit_key: Option<AccountId>,
    ) -> LedgerResult<TopicId> {
        if let Some(key) = &submit_key {
            self.account(key)?;
        }

        let id = TopicId::new(self.allocate_id()?);
        self.topics.insert(id, Topic::new(id, memo.into(), submit_key));

        debug!("Created topic {}", id);
        Ok(id)
    }

    /// Publish a message, charging the transaction fee to `payer`
    pub fn submit_message(
        &mut self,
        topic: &TopicId,
        payer: &AccountId,
        signatures: &BTreeSet<AccountId>,
        contents: &str,
    ) -> LedgerResult<TopicMessage> {
        let have = self.get_hbar_balance(payer)?;
        let definition = self.topic(topic)?;

        if let Some(key) = definition.submit_key() {
            if key != payer && !signatures.contains(key) {
                return Err(LedgerError::MissingSignature(*key));
            }
        }
        validate_message(contents)?;

        let fee = self.config().transaction_fee;
        self.fees_collected()
            .checked_add(fee)
            .ok_or(LedgerError::Overflow)?;
        if have < fee {
            return Err(LedgerError::InsufficientFunds {
                account: *payer,
                asset: Asset::Hbar,
                need: fee,
                have,
            });
        }

        let sequence_number = definition.sequence_number() + 1;
        let running_hash = definition.next_running_hash(sequence_number, contents);
        let message = TopicMessage {
            topic: *topic,
            sequence_number,
            contents: contents.to_string(),
            payer: *payer,
            running_hash: hex::encode(running_hash),
        };

        self.debit_hbar(payer, fee)?;
        self.collect_fee(fee)?;
        let definition = self.topic_mut(topic)?;
        definition.running_hash = running_hash;
        definition.messages.push(message.clone());

        debug!("Topic {} accepted message #{}", topic, sequence_number);
        Ok(message)
    }

    /// Messages with a sequence number of at least `from_sequence`
    pub fn topic_messages(
        &self,
        topic: &TopicId,
        from_sequence: u64,
    ) -> LedgerResult<Vec<TopicMessage>> {
        Ok(self
            .topic(topic)?
            .messages()
            .iter()
            .filter(|message| message.sequence_number >= from_sequence)
            .cloned()
            .collect())
    }
}
