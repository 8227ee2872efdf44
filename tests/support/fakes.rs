#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use chainpilot::agent::{Agent, AgentOptions};
use chainpilot::chain::{
    ChainExecutor, ChainLog, ChainOutcome, ChainSnapshot, DeploymentReceipt, LogFilter,
};
use chainpilot::error::{ChainError, ReasoningError, StoreError};
use chainpilot::knowledge::KnowledgeBinding;
use chainpilot::reasoning::{ReasoningBackend, ReasoningRequest, ReasoningResponse, parse_reply};
use chainpilot::task::{FileTaskStore, NewTask, Task, TaskStats, TaskStore};

/// What [`StubBackend`] does with each request.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Structured reply echoing the goal
    Echo,
    /// Run the raw payload through the shared reply parser
    Raw(String),
    Fail,
    /// Never returns
    Hang,
}

/// Reasoning backend that records every request it sees.
pub struct StubBackend {
    reply: StubReply,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl StubBackend {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn echo() -> Arc<Self> {
        Self::new(StubReply::Echo)
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ReasoningBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn generate(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ReasoningError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            StubReply::Echo => Ok(ReasoningResponse {
                thought: format!("considering {}", request.goal),
                reply: format!("answer to {}", request.goal),
            }),
            StubReply::Raw(raw) => parse_reply(raw),
            StubReply::Fail => Err(ReasoningError::Transport {
                backend: "stub".into(),
                message: "connection refused".into(),
            }),
            StubReply::Hang => std::future::pending().await,
        }
    }
}

/// Chain executor that records `execute_action` calls and replays a fixed outcome.
pub struct RecordingExecutor {
    outcome: Result<ChainOutcome, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingExecutor {
    pub fn succeeding(observation: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(ChainOutcome {
                observation: observation.into(),
                chain_id: Some("11155111".into()),
                block_number: Some("4242".into()),
            }),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainExecutor for RecordingExecutor {
    fn network(&self) -> &str {
        "recording"
    }

    async fn execute_action(
        &self,
        action: &str,
        address: &str,
    ) -> Result<ChainOutcome, ChainError> {
        self.calls
            .lock()
            .unwrap()
            .push((action.to_string(), address.to_string()));
        self.outcome.clone().map_err(|message| ChainError::Rpc {
            method: "eth_getBalance".into(),
            message,
        })
    }

    async fn snapshot(&self) -> Result<ChainSnapshot, ChainError> {
        Ok(ChainSnapshot {
            network: "recording".into(),
            chain_id: 11_155_111,
            block_number: 4242,
        })
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
        Ok(Vec::new())
    }
}

/// Store wrapper that can fail history reads or writes.
pub struct FlakyStore {
    inner: FileTaskStore,
    fail_reads: bool,
    fail_writes: bool,
}

impl FlakyStore {
    pub fn failing_reads() -> Arc<Self> {
        Arc::new(Self {
            inner: FileTaskStore::ephemeral(),
            fail_reads: true,
            fail_writes: false,
        })
    }

    pub fn failing_writes() -> Arc<Self> {
        Arc::new(Self {
            inner: FileTaskStore::ephemeral(),
            fail_reads: false,
            fail_writes: true,
        })
    }
}

#[async_trait]
impl TaskStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn create(&self, draft: NewTask) -> Result<Task, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Database("disk I/O error".into()));
        }
        self.inner.create(draft).await
    }

    async fn recent_by_time(&self, limit: usize) -> Result<Vec<Task>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database("database is locked".into()));
        }
        self.inner.recent_by_time(limit).await
    }

    async fn get(&self, id: i64) -> Result<Task, StoreError> {
        self.inner.get(id).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }

    async fn stats(&self) -> Result<TaskStats, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database("database is locked".into()));
        }
        self.inner.stats().await
    }
}

pub fn options(memory_depth: usize) -> AgentOptions {
    AgentOptions {
        memory_depth,
        ..AgentOptions::default()
    }
}

pub fn agent_with(
    backend: Arc<dyn ReasoningBackend>,
    chain: Arc<dyn ChainExecutor>,
    store: Arc<dyn TaskStore>,
    options: AgentOptions,
) -> Agent {
    Agent::new(backend, chain, store, KnowledgeBinding::Absent, options)
}
