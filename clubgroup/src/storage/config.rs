//! Configuration structures for storage backends

use serde::{Deserialize, Serialize};

/// Which document store backs the repository
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process store (for testing and embedding)
    Memory,
    /// SurrealDB (embedded)
    #[default]
    #[serde(rename = "surrealdb")]
    SurrealDB,
}

/// SurrealDB configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurrealDBConfig {
    /// SurrealDB engine type
    pub engine: SurrealDBEngine,

    /// Path for the on-disk engine
    pub connection: String,

    /// Namespace
    pub namespace: String,

    /// Database name
    pub database: String,
}

impl Default for SurrealDBConfig {
    fn default() -> Self {
        Self {
            engine: SurrealDBEngine::Memory,
            connection: "./data/clubgroup".to_string(),
            namespace: "clubgroup".to_string(),
            database: "main".to_string(),
        }
    }
}

/// SurrealDB engine types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SurrealDBEngine {
    /// In-memory storage (for testing)
    Memory,
    /// RocksDB on-disk storage (embedded)
    #[serde(rename = "rocksdb")]
    RocksDB,
}

/// Storage section of the repository configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend to use
    pub backend: StorageBackend,

    /// SurrealDB settings, used when `backend` is `surrealdb`
    pub surrealdb: SurrealDBConfig,
}
