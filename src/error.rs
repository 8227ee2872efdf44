use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Failure of one orchestration cycle.
///
/// Only the fatal kinds ever reach a caller of `Agent::run`. Knowledge and
/// chain failures are absorbed by the agent and recorded as data, but the
/// variants exist so collaborators can be driven directly (CLI, tests).
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage: {0}")]
    Storage(#[from] StoreError),

    #[error("knowledge lookup: {0}")]
    KnowledgeLookup(#[from] KnowledgeError),

    #[error("reasoning: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("chain execution: {0}")]
    ChainExecution(#[from] ChainError),

    #[error("request cancelled during {step}")]
    Cancelled { step: Step },

    #[error("request deadline exceeded during {step}")]
    Timeout { step: Step },

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// Orchestration step, used to label cancellation and timeout failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    History,
    Knowledge,
    Reasoning,
    Chain,
    Persist,
}

impl AgentError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Storage(StoreError::NotFound(_)) => "not_found",
            Self::Storage(_) => "storage_error",
            Self::KnowledgeLookup(_) => "knowledge_lookup_error",
            Self::Reasoning(_) => "reasoning_error",
            Self::ChainExecution(_) => "chain_execution_error",
            Self::Cancelled { .. } => "cancelled",
            Self::Timeout { .. } => "timeout",
            Self::Config(_) => "config_error",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Reasoning(ReasoningError::Timeout(_))
        )
    }
}

// ─── Task store errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(i64),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("record codec: {0}")]
    Codec(String),

    #[error("database: {0}")]
    Database(String),

    #[error("schema migration failed: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

// ─── Knowledge errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read catalogue {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to decode catalogue {path}: {message}")]
    Decode { path: String, message: String },
}

// ─── Reasoning errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("backend {backend} unreachable: {message}")]
    Transport { backend: String, message: String },

    #[error("backend {backend} returned status {status}: {body}")]
    Status {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("backend {backend} payload could not be decoded: {message}")]
    Decode { backend: String, message: String },

    #[error("backend returned an empty reply")]
    EmptyReply,

    #[error("backend did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("script process failed: {0}")]
    Process(String),

    #[error("backend misconfigured: {0}")]
    Config(String),
}

// ─── Chain errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("unsupported chain action '{0}'")]
    UnsupportedAction(String),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("rpc {method} failed: {message}")]
    Rpc { method: String, message: String },

    #[error("rpc transport: {0}")]
    Transport(String),

    #[error("rpc {method} returned an undecodable result: {message}")]
    Decode { method: String, message: String },

    #[error("no chain network configured")]
    NotConfigured,

    #[error("chain action timed out after {0:?}")]
    Timeout(std::time::Duration),
}

// ─── Config errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
