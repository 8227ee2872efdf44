use super::parse::parse_reply;
use super::traits::{HistoryEntry, ReasoningBackend, ReasoningRequest, ReasoningResponse};
use crate::error::ReasoningError;
use crate::knowledge::KnowledgeCard;
use crate::utils::sanitize_api_error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Reasoning delegated to an external script.
///
/// Protocol: one JSON request object on stdin, one JSON
/// `{"thought", "reply"}` object (or `{"error"}`) on stdout. The child is
/// killed if the generation future is dropped.
pub struct ScriptBackend {
    interpreter: String,
    script_path: PathBuf,
    working_dir: PathBuf,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ScriptPayload<'a> {
    goal: &'a str,
    chain_action: &'a str,
    address: &'a str,
    history: &'a [HistoryEntry],
    knowledge: &'a [KnowledgeCard],
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct ScriptFailure {
    error: String,
}

/// Absolute script paths are kept; relative ones are joined onto `base_dir`.
pub fn resolve_script_path(base_dir: &Path, script: &str) -> PathBuf {
    let script = Path::new(script.trim());
    if script.is_absolute() {
        script.to_path_buf()
    } else {
        base_dir.join(script)
    }
}

impl ScriptBackend {
    pub fn new(
        interpreter: impl Into<String>,
        script_path: PathBuf,
        working_dir: PathBuf,
        timeout: Duration,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script_path,
            working_dir,
            timeout,
        }
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    fn payload(request: &ReasoningRequest) -> Result<Vec<u8>, ReasoningError> {
        serde_json::to_vec(&ScriptPayload {
            goal: &request.goal,
            chain_action: &request.chain_action,
            address: &request.address,
            history: &request.history,
            knowledge: &request.knowledge,
            timestamp: chrono::Utc::now().timestamp(),
        })
        .map_err(|e| ReasoningError::Process(format!("failed to encode request: {e}")))
    }
}

#[async_trait]
impl ReasoningBackend for ScriptBackend {
    fn name(&self) -> &str {
        "script"
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ReasoningError> {
        let payload = Self::payload(request)?;

        let mut child = Command::new(&self.interpreter)
            .arg(&self.script_path)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ReasoningError::Process(format!(
                    "failed to spawn {} {}: {e}",
                    self.interpreter,
                    self.script_path.display()
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReasoningError::Process("child stdin unavailable".into()))?;

        // Feed stdin while collecting output so a chatty script cannot
        // deadlock on a full pipe.
        let feed = async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output
            .map_err(|e| ReasoningError::Process(format!("failed to collect output: {e}")))?;
        if let Err(e) = fed
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(ReasoningError::Process(format!("failed to write request: {e}")));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReasoningError::Process(format!(
                "script exited with {}: {}",
                output.status,
                sanitize_api_error(&stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Ok(failure) = serde_json::from_str::<ScriptFailure>(stdout.trim())
            && !failure.error.trim().is_empty()
        {
            return Err(ReasoningError::Process(sanitize_api_error(&failure.error)));
        }

        parse_reply(&stdout)
    }
}
