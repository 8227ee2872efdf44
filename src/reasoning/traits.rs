use crate::error::ReasoningError;
use crate::knowledge::KnowledgeCard;
use crate::task::Task;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Past task projected into reasoning context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub goal: String,
    pub chain_action: String,
    pub reply: String,
    pub observations: String,
    pub created_at: i64,
}

impl From<&Task> for HistoryEntry {
    fn from(task: &Task) -> Self {
        Self {
            goal: task.goal.clone(),
            chain_action: task.chain_action.clone(),
            reply: task.reply.clone(),
            observations: task.observations.clone(),
            created_at: task.created_at,
        }
    }
}

/// Everything a backend sees for one generation.
///
/// `history` is newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReasoningRequest {
    pub goal: String,
    pub chain_action: String,
    pub address: String,
    pub history: Vec<HistoryEntry>,
    pub knowledge: Vec<KnowledgeCard>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningResponse {
    pub thought: String,
    pub reply: String,
}

/// Stateless request/response reasoning engine.
///
/// Callers bound `generate` with a timeout and may drop the future at any
/// point; implementations must release their connection or child process
/// when that happens.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Budget used when the agent has no explicit reasoning timeout.
    fn default_timeout(&self) -> Duration;

    async fn generate(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ReasoningError>;
}
