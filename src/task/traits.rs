use super::types::{NewTask, Task, TaskStats};
use crate::error::StoreError;
use async_trait::async_trait;

/// Append-mostly task ledger.
///
/// Implementations serialize concurrent writes themselves: ids are unique and
/// strictly increasing in creation order, `created_at` never decreases, and a
/// read observes every write that completed before it began.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Assign id and timestamps, then durably write the record.
    async fn create(&self, draft: NewTask) -> Result<Task, StoreError>;

    /// Most recent tasks, newest first. `limit == 0` yields nothing.
    async fn recent_by_time(&self, limit: usize) -> Result<Vec<Task>, StoreError>;

    async fn get(&self, id: i64) -> Result<Task, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    /// Record count with the oldest and newest `created_at`.
    async fn stats(&self) -> Result<TaskStats, StoreError>;
}

pub(crate) fn now_epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
