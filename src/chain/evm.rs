use super::hexutil::{
    format_ether, normalize_address, normalize_hex_blob, parse_hex_u64, parse_hex_u256,
};
use super::traits::{
    ChainExecutor, ChainLog, ChainOutcome, ChainSnapshot, DeploymentReceipt, LogFilter,
};
use crate::error::ChainError;
use crate::utils::{build_http_client_with_timeout, sanitize_api_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Read-only actions understood by [`EvmExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum EvmAction {
    #[strum(to_string = "balance", serialize = "eth_getBalance")]
    Balance,
    #[strum(
        to_string = "nonce",
        serialize = "transaction_count",
        serialize = "eth_getTransactionCount"
    )]
    Nonce,
    #[strum(to_string = "code", serialize = "eth_getCode")]
    Code,
    #[strum(to_string = "block_number", serialize = "eth_blockNumber")]
    BlockNumber,
    #[strum(to_string = "chain_id", serialize = "eth_chainId")]
    ChainId,
}

impl EvmAction {
    pub fn parse(raw: &str) -> Result<Self, ChainError> {
        Self::from_str(raw.trim()).map_err(|_| ChainError::UnsupportedAction(raw.trim().into()))
    }

    pub fn method(self) -> &'static str {
        match self {
            Self::Balance => "eth_getBalance",
            Self::Nonce => "eth_getTransactionCount",
            Self::Code => "eth_getCode",
            Self::BlockNumber => "eth_blockNumber",
            Self::ChainId => "eth_chainId",
        }
    }

    pub fn needs_address(self) -> bool {
        matches!(self, Self::Balance | Self::Nonce | Self::Code)
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    #[serde(default)]
    contract_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    data: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    transaction_hash: Option<String>,
}

/// JSON-RPC 2.0 client for one EVM network.
pub struct EvmExecutor {
    network: String,
    rpc_url: String,
    client: Client,
    next_id: AtomicU64,
}

impl EvmExecutor {
    pub fn new(network: impl Into<String>, rpc_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            network: network.into(),
            rpc_url: rpc_url.into(),
            client: build_http_client_with_timeout(timeout),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn post(&self, method: &str, body: &Value) -> Result<Value, ChainError> {
        let response = self
            .client
            .post(&self.rpc_url)
            .json(body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(sanitize_api_error(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Rpc {
                method: method.to_string(),
                message: format!("HTTP {}: {}", status.as_u16(), sanitize_api_error(&body)),
            });
        }

        response.json().await.map_err(|e| ChainError::Decode {
            method: method.to_string(),
            message: e.to_string(),
        })
    }

    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.request_id(),
            "method": method,
            "params": params,
        });
        let raw = self.post(method, &body).await?;
        let response: RpcResponse =
            serde_json::from_value(raw).map_err(|e| ChainError::Decode {
                method: method.to_string(),
                message: e.to_string(),
            })?;
        decode_result(method, response)
    }

    async fn quantity(&self, method: &str, params: Value) -> Result<u64, ChainError> {
        let raw: String = self.rpc_call(method, params).await?;
        parse_hex_u64(&raw).ok_or_else(|| ChainError::Decode {
            method: method.to_string(),
            message: format!("invalid quantity '{raw}'"),
        })
    }

    async fn observe(&self, action: EvmAction, address: &str) -> Result<String, ChainError> {
        let method = action.method();
        match action {
            EvmAction::Balance => {
                let raw: String = self.rpc_call(method, json!([address, "latest"])).await?;
                let wei = parse_hex_u256(&raw).ok_or_else(|| ChainError::Decode {
                    method: method.to_string(),
                    message: format!("invalid balance '{raw}'"),
                })?;
                Ok(format!("balance={} ETH", format_ether(wei)))
            }
            EvmAction::Nonce => {
                let nonce = self.quantity(method, json!([address, "latest"])).await?;
                Ok(format!("nonce={nonce}"))
            }
            EvmAction::Code => {
                let raw: String = self.rpc_call(method, json!([address, "latest"])).await?;
                let digits = raw.trim().trim_start_matches("0x").len();
                Ok(format!("code_size={} bytes", digits / 2))
            }
            EvmAction::BlockNumber => {
                let block = self.quantity(method, json!([])).await?;
                Ok(format!("block_number={block}"))
            }
            EvmAction::ChainId => {
                let chain_id = self.quantity(method, json!([])).await?;
                Ok(format!("chain_id={chain_id}"))
            }
        }
    }
}

fn decode_result<T: DeserializeOwned>(method: &str, response: RpcResponse) -> Result<T, ChainError> {
    if let Some(error) = response.error {
        return Err(ChainError::Rpc {
            method: method.to_string(),
            message: format!("{} (code {})", sanitize_api_error(&error.message), error.code),
        });
    }
    let result = response.result.unwrap_or(Value::Null);
    serde_json::from_value(result).map_err(|e| ChainError::Decode {
        method: method.to_string(),
        message: e.to_string(),
    })
}

fn block_tag(block: Option<u64>) -> Value {
    block.map_or_else(|| json!("latest"), |n| json!(format!("0x{n:x}")))
}

#[async_trait]
impl ChainExecutor for EvmExecutor {
    fn network(&self) -> &str {
        &self.network
    }

    async fn execute_action(
        &self,
        action: &str,
        address: &str,
    ) -> Result<ChainOutcome, ChainError> {
        let action = EvmAction::parse(action)?;
        let address = if action.needs_address() {
            normalize_address(address).ok_or_else(|| ChainError::InvalidAddress(address.into()))?
        } else {
            String::new()
        };

        let observation = self.observe(action, &address).await?;

        let (chain_id, block_number) = match self.snapshot().await {
            Ok(snapshot) => (
                Some(snapshot.chain_id.to_string()),
                Some(snapshot.block_number.to_string()),
            ),
            Err(e) => {
                tracing::debug!(network = %self.network, error = %e, "chain snapshot unavailable");
                (None, None)
            }
        };

        tracing::debug!(network = %self.network, %action, "chain action executed");
        Ok(ChainOutcome {
            observation,
            chain_id,
            block_number,
        })
    }

    async fn snapshot(&self) -> Result<ChainSnapshot, ChainError> {
        let chain_id = self.quantity("eth_chainId", json!([])).await?;
        let block_number = self.quantity("eth_blockNumber", json!([])).await?;
        Ok(ChainSnapshot {
            network: self.network.clone(),
            chain_id,
            block_number,
        })
    }

    async fn deploy_contract(&self, raw_signed_tx: &str) -> Result<DeploymentReceipt, ChainError> {
        let raw = normalize_hex_blob(raw_signed_tx).ok_or_else(|| ChainError::Rpc {
            method: "eth_sendRawTransaction".into(),
            message: "signed transaction must be 0x-prefixed even-length hex".into(),
        })?;
        let tx_hash: String = self.rpc_call("eth_sendRawTransaction", json!([raw])).await?;

        // Contract address is only known once mined; a pending receipt is not an error.
        let contract_address = match self
            .rpc_call::<Option<RpcReceipt>>("eth_getTransactionReceipt", json!([tx_hash]))
            .await
        {
            Ok(receipt) => receipt.and_then(|r| r.contract_address),
            Err(e) => {
                tracing::debug!(%tx_hash, error = %e, "deployment receipt not yet available");
                None
            }
        };

        Ok(DeploymentReceipt {
            tx_hash,
            contract_address,
        })
    }

    async fn send_batch_transactions(
        &self,
        raw_signed_txs: &[String],
    ) -> Result<Vec<String>, ChainError> {
        const METHOD: &str = "eth_sendRawTransaction";
        if raw_signed_txs.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::with_capacity(raw_signed_txs.len());
        let mut batch = Vec::with_capacity(raw_signed_txs.len());
        for raw in raw_signed_txs {
            let raw = normalize_hex_blob(raw).ok_or_else(|| ChainError::Rpc {
                method: METHOD.into(),
                message: "signed transaction must be 0x-prefixed even-length hex".into(),
            })?;
            let id = self.request_id();
            ids.push(id);
            batch.push(json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": METHOD,
                "params": [raw],
            }));
        }

        let raw = self.post(METHOD, &Value::Array(batch)).await?;
        let responses: Vec<RpcResponse> =
            serde_json::from_value(raw).map_err(|e| ChainError::Decode {
                method: METHOD.into(),
                message: e.to_string(),
            })?;

        // Servers may answer batch entries in any order.
        let mut by_id: std::collections::HashMap<u64, RpcResponse> = responses
            .into_iter()
            .filter_map(|r| r.id.map(|id| (id, r)))
            .collect();
        ids.into_iter()
            .map(|id| {
                let response = by_id.remove(&id).ok_or_else(|| ChainError::Decode {
                    method: METHOD.into(),
                    message: format!("missing response for batch id {id}"),
                })?;
                decode_result(METHOD, response)
            })
            .collect()
    }

    async fn fetch_logs(&self, filter: &LogFilter) -> Result<Vec<ChainLog>, ChainError> {
        let mut params = serde_json::Map::new();
        if let Some(address) = filter.address.as_deref() {
            let address = normalize_address(address)
                .ok_or_else(|| ChainError::InvalidAddress(address.into()))?;
            params.insert("address".into(), json!(address));
        }
        if !filter.topics.is_empty() {
            params.insert("topics".into(), json!(filter.topics));
        }
        params.insert("fromBlock".into(), block_tag(filter.from_block));
        params.insert("toBlock".into(), block_tag(filter.to_block));

        let logs: Vec<RpcLog> = self
            .rpc_call("eth_getLogs", json!([Value::Object(params)]))
            .await?;
        Ok(logs
            .into_iter()
            .map(|log| ChainLog {
                address: log.address,
                topics: log.topics,
                data: log.data,
                block_number: log.block_number.as_deref().and_then(parse_hex_u64),
                transaction_hash: log.transaction_hash,
            })
            .collect())
    }
}
