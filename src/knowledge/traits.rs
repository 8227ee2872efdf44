use crate::error::KnowledgeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Titled reference snippet injected into the reasoning prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeCard {
    pub title: String,
    pub content: String,
}

/// Read-only topical lookup.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    fn name(&self) -> &str;

    /// Upper bound on cards returned by [`lookup`](Self::lookup).
    fn max_results(&self) -> usize;

    /// Cards relevant to the goal and requested chain action, at most
    /// `max_results()` of them.
    async fn lookup(
        &self,
        goal: &str,
        chain_action: &str,
    ) -> Result<Vec<KnowledgeCard>, KnowledgeError>;
}
