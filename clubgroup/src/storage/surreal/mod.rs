//! SurrealDB-backed group store
//!
//! Persists groups in the `club_group` table of an embedded SurrealDB instance.
//! The store only persists; derivation and hooks stay in the lifecycle layer.

use std::fmt::Debug;

use surrealdb::{Connection, Surreal};

use crate::storage::config::{SurrealDBConfig, SurrealDBEngine};
use crate::storage::errors::StorageError;

pub mod group;
pub mod schema;

/// Type alias for the embedded store
pub type EmbeddedGroupStore = SurrealGroupStore<surrealdb::engine::local::Db>;

/// Group store on top of a SurrealDB client
#[derive(Debug, Clone)]
pub struct SurrealGroupStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    pub(crate) client: Surreal<C>,
    pub(crate) namespace: String,
    pub(crate) database: String,
}

impl<C> SurrealGroupStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    /// Select namespace and database, then initialize the schema
    pub async fn new(
        client: Surreal<C>,
        namespace: &str,
        database: &str,
    ) -> Result<Self, StorageError> {
        client.use_ns(namespace).use_db(database).await.map_err(|e| {
            StorageError::Connection(format!("Failed to set namespace/database: {}", e))
        })?;

        schema::initialize_schema(&client).await?;

        Ok(Self {
            client,
            namespace: namespace.to_string(),
            database: database.to_string(),
        })
    }

    /// Get the underlying client for advanced operations
    pub fn client(&self) -> &Surreal<C> {
        &self.client
    }
}

/// Create an embedded store from configuration
pub async fn create_surreal_store(
    config: &SurrealDBConfig,
) -> Result<EmbeddedGroupStore, StorageError> {
    match config.engine {
        SurrealDBEngine::Memory => {
            tracing::info!("Creating SurrealDB group store with in-memory engine");
            let client = Surreal::new::<surrealdb::engine::local::Mem>(())
                .await
                .map_err(|e| {
                    StorageError::Connection(format!("Failed to create memory client: {}", e))
                })?;
            SurrealGroupStore::new(client, &config.namespace, &config.database).await
        }
        #[cfg(feature = "surrealdb-rocksdb")]
        SurrealDBEngine::RocksDB => {
            tracing::info!(
                "Creating SurrealDB group store with RocksDB engine at {}",
                config.connection
            );
            let client = Surreal::new::<surrealdb::engine::local::RocksDb>(config.connection.as_str())
                .await
                .map_err(|e| {
                    StorageError::Connection(format!("Failed to create RocksDB client: {}", e))
                })?;
            SurrealGroupStore::new(client, &config.namespace, &config.database).await
        }
        #[cfg(not(feature = "surrealdb-rocksdb"))]
        SurrealDBEngine::RocksDB => Err(StorageError::Configuration(
            "RocksDB engine requires the 'surrealdb-rocksdb' feature to be enabled".to_string(),
        )),
    }
}
