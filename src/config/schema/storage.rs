use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "memory" (file-backed, in-process) | "sqlite"
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Directory holding `tasks.log` and the default SQLite file
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Defaults to `<data_dir>/tasks.db`
    #[serde(default)]
    pub sqlite_path: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_driver() -> String {
    "memory".into()
}

fn default_data_dir() -> String {
    "data".into()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            data_dir: default_data_dir(),
            sqlite_path: None,
            max_connections: default_max_connections(),
        }
    }
}
