use super::traits::{KnowledgeCard, KnowledgeSource};
use crate::error::KnowledgeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One catalogue entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Snippet {
    /// Entries without keywords are general-purpose and always match.
    /// Otherwise any keyword or tag contained in the goal or chain action
    /// (case-insensitive) is a match.
    fn matches(&self, goal: &str, chain_action: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let contains = |needle: &String| {
            let needle = needle.trim().to_lowercase();
            !needle.is_empty() && (goal.contains(&needle) || chain_action.contains(&needle))
        };
        self.keywords.iter().any(contains) || self.tags.iter().any(contains)
    }
}

/// Knowledge catalogue loaded once from a JSON array of [`Snippet`]s.
pub struct StaticKnowledgeSource {
    snippets: Vec<Snippet>,
    max_results: usize,
}

impl StaticKnowledgeSource {
    pub fn new(snippets: Vec<Snippet>, max_results: usize) -> Self {
        Self {
            snippets,
            max_results,
        }
    }

    pub async fn load(path: &Path, max_results: usize) -> Result<Self, KnowledgeError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| KnowledgeError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let snippets: Vec<Snippet> =
            serde_json::from_str(&raw).map_err(|e| KnowledgeError::Decode {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(snippets, max_results))
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

#[async_trait]
impl KnowledgeSource for StaticKnowledgeSource {
    fn name(&self) -> &str {
        "static"
    }

    fn max_results(&self) -> usize {
        self.max_results
    }

    async fn lookup(
        &self,
        goal: &str,
        chain_action: &str,
    ) -> Result<Vec<KnowledgeCard>, KnowledgeError> {
        let goal = goal.to_lowercase();
        let chain_action = chain_action.to_lowercase();

        Ok(self
            .snippets
            .iter()
            .filter(|s| !s.content.trim().is_empty())
            .filter(|s| s.matches(&goal, &chain_action))
            .take(self.max_results)
            .map(|s| KnowledgeCard {
                title: s.title.clone(),
                content: s.content.clone(),
            })
            .collect())
    }
}
