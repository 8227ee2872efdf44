use super::orchestrator::{Agent, AgentOptions};
use crate::chain::ChainRegistry;
use crate::config::Config;
use crate::knowledge::create_knowledge;
use crate::reasoning::create_backend;
use crate::task::create_task_store;

/// Wire an [`Agent`] from configuration.
///
/// Every collaborator is constructed once here and shared by reference
/// across requests.
pub async fn build_agent(config: &Config) -> anyhow::Result<Agent> {
    let store = create_task_store(config).await?;
    let reasoning = create_backend(config)?;
    let knowledge = create_knowledge(config).await?;
    let chain = ChainRegistry::from_config(&config.chain, config.agent.chain_timeout())
        .default_executor();

    tracing::info!(
        store = store.name(),
        reasoning = reasoning.name(),
        knowledge = knowledge.name(),
        network = chain.network(),
        memory_depth = config.agent.memory_depth,
        "agent ready"
    );

    Ok(Agent::new(
        reasoning,
        chain,
        store,
        knowledge,
        AgentOptions::from_config(&config.agent),
    ))
}
