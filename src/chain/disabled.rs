use super::traits::{
    ChainExecutor, ChainLog, ChainOutcome, ChainSnapshot, DeploymentReceipt, LogFilter,
};
use crate::error::ChainError;
use async_trait::async_trait;

/// Stand-in when no network is configured. Every call fails with
/// [`ChainError::NotConfigured`], which the agent records as an observation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledExecutor;

#[async_trait]
impl ChainExecutor for DisabledExecutor {
    fn network(&self) -> &str {
        "none"
    }

    async fn execute_action(
        &self,
        _action: &str,
        _address: &str,
    ) -> Result<ChainOutcome, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn snapshot(&self) -> Result<ChainSnapshot, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn deploy_contract(&self, _raw_signed_tx: &str) -> Result<DeploymentReceipt, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn send_batch_transactions(
        &self,
        _raw_signed_txs: &[String],
    ) -> Result<Vec<String>, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn fetch_logs(&self, _filter: &LogFilter) -> Result<Vec<ChainLog>, ChainError> {
        Err(ChainError::NotConfigured)
    }
}
