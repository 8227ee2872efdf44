use super::{FileTaskStore, SqliteTaskStore, TaskStore};
use crate::config::Config;
use anyhow::Context;
use std::sync::Arc;

/// Build the task store selected by `[storage] driver`.
pub async fn create_task_store(config: &Config) -> anyhow::Result<Arc<dyn TaskStore>> {
    let storage = &config.storage;
    let store: Arc<dyn TaskStore> = match storage.driver.as_str() {
        "memory" => {
            let data_dir = config.data_dir();
            let store = FileTaskStore::open(&data_dir)
                .await
                .with_context(|| format!("Failed to open task log in {}", data_dir.display()))?;
            Arc::new(store)
        }
        "sqlite" => {
            let path = storage.sqlite_path.as_deref().map_or_else(
                || config.data_dir().join("tasks.db"),
                |p| config.resolve_path(p),
            );
            let store = SqliteTaskStore::open(&path, storage.max_connections)
                .await
                .with_context(|| format!("Failed to open task database {}", path.display()))?;
            Arc::new(store)
        }
        other => {
            anyhow::bail!("Unknown storage driver '{other}'. Supported: memory, sqlite");
        }
    };

    tracing::info!(driver = store.name(), "task store ready");
    Ok(store)
}
