use crate::chain::ChainOutcome;
use serde::{Deserialize, Serialize};

/// One persisted orchestration attempt.
///
/// Optional text fields use the empty string for "absent" so the record maps
/// one-to-one onto the relational layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub goal: String,
    #[serde(default)]
    pub chain_action: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub thought: String,
    pub reply: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub block_number: String,
    #[serde(default)]
    pub observations: String,
    /// Unix seconds
    pub created_at: i64,
    /// Unix seconds
    pub updated_at: i64,
}

impl Task {
    pub fn chain_requested(&self) -> bool {
        !self.chain_action.is_empty()
    }
}

/// Aggregate view of the ledger. Timestamps are `None` while it is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub oldest_created_at: Option<i64>,
    pub newest_created_at: Option<i64>,
}

/// A task assembled by the agent but not yet persisted.
///
/// The store assigns `id` and timestamps in [`TaskStore::create`].
///
/// [`TaskStore::create`]: super::TaskStore::create
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    goal: String,
    chain_action: String,
    address: String,
    thought: String,
    reply: String,
    chain_id: String,
    block_number: String,
    observations: String,
}

impl NewTask {
    pub fn new(
        goal: impl Into<String>,
        chain_action: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            goal: goal.into(),
            chain_action: chain_action.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn chain_action(&self) -> &str {
        &self.chain_action
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn thought(&self) -> &str {
        &self.thought
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn block_number(&self) -> &str {
        &self.block_number
    }

    pub fn observations(&self) -> &str {
        &self.observations
    }

    pub fn with_reasoning(mut self, thought: impl Into<String>, reply: impl Into<String>) -> Self {
        self.thought = thought.into();
        self.reply = reply.into();
        self
    }

    /// Record a successful chain action.
    pub fn with_chain_outcome(mut self, outcome: ChainOutcome) -> Self {
        self.observations = outcome.observation;
        self.chain_id = outcome.chain_id.unwrap_or_default();
        self.block_number = outcome.block_number.unwrap_or_default();
        self
    }

    /// Record a failed chain action. Chain identifiers stay empty.
    pub fn with_chain_failure(mut self, message: impl Into<String>) -> Self {
        self.observations = message.into();
        self.chain_id.clear();
        self.block_number.clear();
        self
    }

    pub fn into_task(self, id: i64, created_at: i64) -> Task {
        Task {
            id,
            goal: self.goal,
            chain_action: self.chain_action,
            address: self.address,
            thought: self.thought,
            reply: self.reply,
            chain_id: self.chain_id,
            block_number: self.block_number,
            observations: self.observations,
            created_at,
            updated_at: created_at,
        }
    }
}
