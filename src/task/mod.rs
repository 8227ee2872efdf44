//! Durable ledger of orchestration attempts.
//!
//! Two interchangeable backends sit behind [`TaskStore`]: a file-backed
//! in-process ledger for development and a SQLite store for production.

pub mod factory;
pub mod file;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use factory::create_task_store;
pub use file::FileTaskStore;
pub use sqlite::SqliteTaskStore;
pub use traits::TaskStore;
pub use types::{NewTask, Task, TaskStats};
