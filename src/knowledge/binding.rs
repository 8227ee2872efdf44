use super::traits::{KnowledgeCard, KnowledgeSource};
use crate::error::KnowledgeError;
use std::sync::Arc;

/// Knowledge collaborator that may legitimately be missing.
#[derive(Clone, Default)]
pub enum KnowledgeBinding {
    #[default]
    Absent,
    Present(Arc<dyn KnowledgeSource>),
}

impl KnowledgeBinding {
    pub fn present(source: Arc<dyn KnowledgeSource>) -> Self {
        Self::Present(source)
    }

    /// Whether a lookup would actually run.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Present(source) => source.max_results() > 0,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Absent => "none",
            Self::Present(source) => source.name(),
        }
    }

    /// Look up cards, skipping empty ones and enforcing the source's cap.
    /// Absent or zero-capacity sources yield an empty set without error.
    pub async fn lookup(
        &self,
        goal: &str,
        chain_action: &str,
    ) -> Result<Vec<KnowledgeCard>, KnowledgeError> {
        let Self::Present(source) = self else {
            return Ok(Vec::new());
        };
        let limit = source.max_results();
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut cards = source.lookup(goal, chain_action).await?;
        cards.retain(|card| !card.content.trim().is_empty());
        cards.truncate(limit);
        Ok(cards)
    }
}

impl std::fmt::Debug for KnowledgeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("KnowledgeBinding::Absent"),
            Self::Present(source) => f
                .debug_tuple("KnowledgeBinding::Present")
                .field(&source.name())
                .finish(),
        }
    }
}
