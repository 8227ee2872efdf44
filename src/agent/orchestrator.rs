use super::context::{Interrupted, RequestContext};
use crate::chain::ChainExecutor;
use crate::config::AgentConfig;
use crate::error::{AgentError, ChainError, ReasoningError, Step};
use crate::knowledge::{KnowledgeBinding, KnowledgeCard};
use crate::reasoning::{HistoryEntry, ReasoningBackend, ReasoningRequest, ReasoningResponse};
use crate::task::{NewTask, Task, TaskStore};
use std::sync::Arc;
use std::time::Duration;

/// Tunables for one [`Agent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentOptions {
    /// Prior tasks fed back as history; 0 disables recall
    pub memory_depth: usize,
    /// Reasoning budget; `None` uses the backend's own default
    pub llm_timeout: Option<Duration>,
    /// Chain budget, further capped by the request deadline
    pub chain_timeout: Duration,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

impl AgentOptions {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            memory_depth: config.memory_depth,
            llm_timeout: config.llm_timeout(),
            chain_timeout: config.chain_timeout(),
        }
    }
}

/// Sequences history recall, knowledge lookup, reasoning, the optional
/// chain action and persistence into one request.
///
/// The agent holds only shared handles to its collaborators, so one
/// instance serves any number of concurrent [`run`](Self::run) calls.
pub struct Agent {
    reasoning: Arc<dyn ReasoningBackend>,
    chain: Arc<dyn ChainExecutor>,
    store: Arc<dyn TaskStore>,
    knowledge: KnowledgeBinding,
    options: AgentOptions,
}

impl Agent {
    pub fn new(
        reasoning: Arc<dyn ReasoningBackend>,
        chain: Arc<dyn ChainExecutor>,
        store: Arc<dyn TaskStore>,
        knowledge: KnowledgeBinding,
        options: AgentOptions,
    ) -> Self {
        Self {
            reasoning,
            chain,
            store,
            knowledge,
            options,
        }
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Run one orchestration cycle and return the persisted task.
    ///
    /// Knowledge and chain failures degrade into data (no cards, a failure
    /// observation). History, reasoning and persistence failures abort the
    /// request, and nothing is written unless persistence was reached.
    pub async fn run(
        &self,
        ctx: &RequestContext,
        goal: &str,
        chain_action: &str,
        address: &str,
    ) -> Result<Task, AgentError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(AgentError::InvalidInput("goal must not be empty".into()));
        }
        let chain_action = chain_action.trim();
        let address = address.trim();

        let history = self.recall_history(ctx).await?;
        let knowledge = self.lookup_knowledge(ctx, goal, chain_action).await?;

        let request = ReasoningRequest {
            goal: goal.to_string(),
            chain_action: chain_action.to_string(),
            address: address.to_string(),
            history,
            knowledge,
        };
        let response = self.reason(ctx, &request).await?;

        let mut draft = NewTask::new(goal, chain_action, address)
            .with_reasoning(response.thought, response.reply);
        if !chain_action.is_empty() {
            draft = self.execute_chain(ctx, draft).await?;
        }

        // Once the write starts it runs to completion.
        ctx.check().map_err(|i| i.at(Step::Persist))?;
        let task = self.store.create(draft).await?;
        tracing::info!(
            task_id = task.id,
            store = self.store.name(),
            chain_action = %task.chain_action,
            "task persisted"
        );
        Ok(task)
    }

    async fn recall_history(&self, ctx: &RequestContext) -> Result<Vec<HistoryEntry>, AgentError> {
        ctx.check().map_err(|i| i.at(Step::History))?;
        let depth = self.options.memory_depth;
        if depth == 0 {
            return Ok(Vec::new());
        }

        let recent = ctx
            .guard(self.store.recent_by_time(depth))
            .await
            .map_err(|i| i.at(Step::History))??;
        let history: Vec<HistoryEntry> = recent.iter().take(depth).map(HistoryEntry::from).collect();
        tracing::debug!(entries = history.len(), depth, "history loaded");
        Ok(history)
    }

    async fn lookup_knowledge(
        &self,
        ctx: &RequestContext,
        goal: &str,
        chain_action: &str,
    ) -> Result<Vec<KnowledgeCard>, AgentError> {
        if !self.knowledge.is_active() {
            return Ok(Vec::new());
        }

        let lookup = ctx
            .guard(self.knowledge.lookup(goal, chain_action))
            .await
            .map_err(|i| i.at(Step::Knowledge))?;
        match lookup {
            Ok(cards) => {
                tracing::debug!(source = self.knowledge.name(), cards = cards.len(), "knowledge loaded");
                Ok(cards)
            }
            Err(e) => {
                tracing::warn!(
                    source = self.knowledge.name(),
                    error = %e,
                    "knowledge lookup failed; continuing without knowledge"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn reason(
        &self,
        ctx: &RequestContext,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, AgentError> {
        let budget = self
            .options
            .llm_timeout
            .unwrap_or_else(|| self.reasoning.default_timeout());

        let response = ctx
            .guard(tokio::time::timeout(budget, self.reasoning.generate(request)))
            .await
            .map_err(|i| i.at(Step::Reasoning))?
            .map_err(|_| ReasoningError::Timeout(budget))??;

        if response.reply.trim().is_empty() {
            return Err(ReasoningError::EmptyReply.into());
        }
        tracing::info!(
            backend = self.reasoning.name(),
            history = request.history.len(),
            knowledge = request.knowledge.len(),
            "reasoning completed"
        );
        Ok(response)
    }

    async fn execute_chain(
        &self,
        ctx: &RequestContext,
        draft: NewTask,
    ) -> Result<NewTask, AgentError> {
        let action = draft.chain_action().to_string();
        let budget = ctx
            .remaining()
            .map_or(self.options.chain_timeout, |left| left.min(self.options.chain_timeout));

        let attempt = ctx
            .guard(tokio::time::timeout(
                budget,
                self.chain.execute_action(&action, draft.address()),
            ))
            .await;

        let failure = match attempt {
            Err(interrupted) => return Err(interrupted.at(Step::Chain)),
            Ok(Err(_)) if ctx.is_expired() => {
                return Err(Interrupted::DeadlineExceeded.at(Step::Chain));
            }
            Ok(Err(_)) => ChainError::Timeout(budget),
            Ok(Ok(Ok(mut outcome))) => {
                if outcome.observation.trim().is_empty() {
                    outcome.observation = format!("chain action `{action}` completed");
                }
                tracing::info!(
                    network = self.chain.network(),
                    action = %action,
                    chain_id = outcome.chain_id.as_deref().unwrap_or(""),
                    "chain action executed"
                );
                return Ok(draft.with_chain_outcome(outcome));
            }
            Ok(Ok(Err(e))) => e,
        };

        tracing::warn!(
            network = self.chain.network(),
            action = %action,
            error = %failure,
            "chain action failed"
        );
        Ok(draft.with_chain_failure(format!("chain action `{action}` failed: {failure}")))
    }
}
