use super::traits::{TaskStore, now_epoch_secs};
use super::types::{NewTask, Task, TaskStats};
use crate::error::StoreError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

const LOG_FILE: &str = "tasks.log";

/// In-process task ledger mirrored to a JSON-lines file.
///
/// Every record lives in memory; each `create` appends one line to
/// `<data_dir>/tasks.log` before the record becomes visible to readers.
pub struct FileTaskStore {
    log_path: Option<PathBuf>,
    ledger: RwLock<Ledger>,
}

#[derive(Default)]
struct Ledger {
    /// Ascending by id
    tasks: Vec<Task>,
    next_id: i64,
    last_created_at: i64,
}

impl FileTaskStore {
    /// Open (or start) the ledger in `data_dir`, replaying an existing log.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir).await?;
        let log_path = data_dir.join(LOG_FILE);

        let tasks = match tokio::fs::read_to_string(&log_path).await {
            Ok(contents) => replay(&contents, &log_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %log_path.display(), records = tasks.len(), "task log replayed");

        Ok(Self {
            log_path: Some(log_path),
            ledger: RwLock::new(Ledger::from_tasks(tasks)),
        })
    }

    /// Memory-only ledger; nothing survives the process.
    pub fn ephemeral() -> Self {
        Self {
            log_path: None,
            ledger: RwLock::new(Ledger::from_tasks(Vec::new())),
        }
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    async fn append_line(&self, task: &Task) -> Result<(), StoreError> {
        let Some(path) = &self.log_path else {
            return Ok(());
        };
        let mut line =
            serde_json::to_string(task).map_err(|e| StoreError::Codec(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl Ledger {
    fn from_tasks(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by_key(|t| t.id);
        tasks.dedup_by_key(|t| t.id);
        let next_id = tasks.last().map_or(1, |t| t.id + 1);
        let last_created_at = tasks.iter().map(|t| t.created_at).max().unwrap_or(0);
        Self {
            tasks,
            next_id,
            last_created_at,
        }
    }
}

fn replay(contents: &str, path: &Path) -> Vec<Task> {
    let mut tasks = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Task>(line) {
            Ok(task) => tasks.push(task),
            Err(e) => tracing::warn!(
                path = %path.display(),
                line = index + 1,
                error = %e,
                "skipping malformed task record"
            ),
        }
    }
    tasks
}

#[async_trait]
impl TaskStore for FileTaskStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(&self, draft: NewTask) -> Result<Task, StoreError> {
        let mut ledger = self.ledger.write().await;
        let created_at = now_epoch_secs().max(ledger.last_created_at);
        let task = draft.into_task(ledger.next_id, created_at);

        self.append_line(&task).await?;

        ledger.next_id += 1;
        ledger.last_created_at = created_at;
        ledger.tasks.push(task.clone());
        Ok(task)
    }

    async fn recent_by_time(&self, limit: usize) -> Result<Vec<Task>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let ledger = self.ledger.read().await;
        let mut recent: Vec<Task> = ledger.tasks.iter().rev().take(limit).cloned().collect();
        // Replayed logs may carry clock skew; keep the documented ordering.
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(recent)
    }

    async fn get(&self, id: i64) -> Result<Task, StoreError> {
        let ledger = self.ledger.read().await;
        ledger
            .tasks
            .binary_search_by_key(&id, |t| t.id)
            .map(|index| ledger.tasks[index].clone())
            .map_err(|_| StoreError::NotFound(id))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.ledger.read().await.tasks.len())
    }

    async fn stats(&self) -> Result<TaskStats, StoreError> {
        let ledger = self.ledger.read().await;
        let created = ledger.tasks.iter().map(|t| t.created_at);
        Ok(TaskStats {
            total: ledger.tasks.len(),
            oldest_created_at: created.clone().min(),
            newest_created_at: created.max(),
        })
    }
}
