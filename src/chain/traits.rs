use crate::error::ChainError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a chain executor reported for a successful action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainOutcome {
    pub observation: String,
    pub chain_id: Option<String>,
    pub block_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSnapshot {
    pub network: String,
    pub chain_id: u64,
    pub block_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReceipt {
    pub tx_hash: String,
    /// Known only once the transaction is mined
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub address: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<String>,
}

/// Network client able to run named actions.
///
/// The agent only calls [`execute_action`](Self::execute_action); the other
/// operations back the `chainpilot chain` subcommands.
#[async_trait]
pub trait ChainExecutor: Send + Sync {
    /// Configured network name.
    fn network(&self) -> &str;

    /// Run `action` against `address` and describe the result.
    async fn execute_action(&self, action: &str, address: &str)
    -> Result<ChainOutcome, ChainError>;

    async fn snapshot(&self) -> Result<ChainSnapshot, ChainError>;

    /// Broadcast a signed contract-creation transaction.
    async fn deploy_contract(&self, raw_signed_tx: &str) -> Result<DeploymentReceipt, ChainError>;

    /// Broadcast signed transactions in one round trip; hashes keep input order.
    async fn send_batch_transactions(
        &self,
        raw_signed_txs: &[String],
    ) -> Result<Vec<String>, ChainError>;

    /// Poll event logs matching `filter`.
    async fn fetch_logs(&self, filter: &LogFilter) -> Result<Vec<ChainLog>, ChainError>;
}
