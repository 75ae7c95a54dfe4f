//! Storage abstractions and implementations
//!
//! The lifecycle pipeline talks to a [`GroupStore`]; the store itself only
//! persists documents and never derives fields or runs hooks.
//!
//! ## Storage Implementations
//!
//! - **SurrealDB**: embedded SurrealDB with a full-text index on the search token
//! - **Memory**: in-process store for testing and embedding

use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod filters;
pub mod memory;
pub mod models;
#[cfg(feature = "surrealdb-embedded")]
pub mod surreal;
pub mod traits;

pub use config::{StorageBackend, StorageConfig, SurrealDBConfig, SurrealDBEngine};
pub use errors::{StorageError, StorageResult};
pub use filters::{GroupFilter, MatchLimit, Projection, search_terms};
pub use memory::MemoryGroupStore;
pub use models::{GroupDocument, StoreUpdate, UpdateResult};
#[cfg(feature = "surrealdb-embedded")]
pub use surreal::{EmbeddedGroupStore, SurrealGroupStore, create_surreal_store};
pub use traits::{BaseStore, GroupStore};

/// Create a group store based on configuration
pub async fn create_group_store(
    config: &StorageConfig,
) -> Result<Arc<dyn GroupStore>, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Creating in-memory group store");
            Ok(Arc::new(MemoryGroupStore::new()))
        }
        #[cfg(feature = "surrealdb-embedded")]
        StorageBackend::SurrealDB => {
            let store = create_surreal_store(&config.surrealdb).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "surrealdb-embedded"))]
        StorageBackend::SurrealDB => Err(StorageError::Configuration(
            "SurrealDB backend requires the 'surrealdb-embedded' feature to be enabled"
                .to_string(),
        )),
    }
}
