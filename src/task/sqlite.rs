use super::traits::{TaskStore, now_epoch_secs};
use super::types::{NewTask, Task, TaskStats};
use crate::error::StoreError;
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use std::path::Path;
use std::time::Duration;

/// Ordered schema migrations; the version is recorded in `schema_migrations`.
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (
        1,
        "create tasks",
        "CREATE TABLE IF NOT EXISTS tasks (
             id           INTEGER PRIMARY KEY AUTOINCREMENT,
             goal         TEXT    NOT NULL,
             chain_action TEXT    NOT NULL DEFAULT '',
             address      TEXT    NOT NULL DEFAULT '',
             thought      TEXT    NOT NULL DEFAULT '',
             reply        TEXT    NOT NULL DEFAULT '',
             observes     TEXT    NOT NULL DEFAULT '',
             chain_id     TEXT    NOT NULL DEFAULT '',
             block_number TEXT    NOT NULL DEFAULT '',
             created_at   INTEGER NOT NULL,
             updated_at   INTEGER NOT NULL
         )",
    ),
    (
        2,
        "index tasks by recency",
        "CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at DESC, id DESC)",
    ),
];

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    name       TEXT    NOT NULL,
    applied_at INTEGER NOT NULL
)";

const TASK_COLUMNS: &str = "id, goal, chain_action, address, thought, reply, observes, \
                            chain_id, block_number, created_at, updated_at";

/// Relational task store on an `sqlx` SQLite pool.
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Open (creating if missing) the database file and migrate it.
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        Self::new(pool).await
    }

    /// Private in-memory database, one connection so every query sees it.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::new(pool).await
    }

    /// Wrap an existing pool and run pending migrations.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Migration(format!("create schema_migrations: {e}")))?;

    let applied: Vec<(i64,)> = sqlx::query_as("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await?;

    for (version, name, sql) in MIGRATIONS {
        if applied.iter().any(|(v,)| v == version) {
            continue;
        }
        let mut tx = pool.begin().await?;
        sqlx::query(sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Migration(format!("{version} ({name}): {e}")))?;
        sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES ($1, $2, $3)")
            .bind(*version)
            .bind(*name)
            .bind(now_epoch_secs())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!(version = *version, name = *name, "task schema migration applied");
    }
    Ok(())
}

fn map_task_row(row: &SqliteRow) -> Result<Task, StoreError> {
    Ok(Task {
        id: row.try_get("id")?,
        goal: row.try_get("goal")?,
        chain_action: row.try_get("chain_action")?,
        address: row.try_get("address")?,
        thought: row.try_get("thought")?,
        reply: row.try_get("reply")?,
        chain_id: row.try_get("chain_id")?,
        block_number: row.try_get("block_number")?,
        observations: row.try_get("observes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create(&self, draft: NewTask) -> Result<Task, StoreError> {
        // The clamp against MAX(created_at) runs inside the insert statement,
        // so concurrent writers cannot observe a decreasing timestamp.
        let row = sqlx::query(
            "INSERT INTO tasks (goal, chain_action, address, thought, reply, observes,
                                chain_id, block_number, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                     MAX($9, COALESCE((SELECT MAX(created_at) FROM tasks), 0)),
                     MAX($9, COALESCE((SELECT MAX(created_at) FROM tasks), 0)))
             RETURNING id, created_at",
        )
        .bind(draft.goal())
        .bind(draft.chain_action())
        .bind(draft.address())
        .bind(draft.thought())
        .bind(draft.reply())
        .bind(draft.observations())
        .bind(draft.chain_id())
        .bind(draft.block_number())
        .bind(now_epoch_secs())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.try_get("id")?;
        let created_at: i64 = row.try_get("created_at")?;
        Ok(draft.into_task(id, created_at))
    }

    async fn recent_by_time(&self, limit: usize) -> Result<Vec<Task>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_task_row).collect()
    }

    async fn get(&self, id: i64) -> Result<Task, StoreError> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => map_task_row(&row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn stats(&self) -> Result<TaskStats, StoreError> {
        let (count, oldest, newest): (i64, Option<i64>, Option<i64>) =
            sqlx::query_as("SELECT COUNT(*), MIN(created_at), MAX(created_at) FROM tasks")
                .fetch_one(&self.pool)
                .await?;
        Ok(TaskStats {
            total: usize::try_from(count).unwrap_or_default(),
            oldest_created_at: oldest,
            newest_created_at: newest,
        })
    }
}
