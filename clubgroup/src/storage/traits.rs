//! Trait definitions for group stores

use async_trait::async_trait;
use std::fmt::Debug;

use crate::models::{Group, GroupId};
use crate::storage::errors::StorageError;
use crate::storage::filters::{GroupFilter, MatchLimit, Projection};
use crate::storage::models::{GroupDocument, StoreUpdate, UpdateResult};

/// Base trait for all storage implementations
#[async_trait]
pub trait BaseStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> std::result::Result<bool, StorageError>;

    /// Clear all data in the store
    async fn clear(&self) -> std::result::Result<(), StorageError>;

    /// Get metadata about the store
    async fn get_metadata(&self) -> std::result::Result<serde_json::Value, StorageError>;

    /// Close connections and release resources
    async fn close(&self) -> std::result::Result<(), StorageError>;
}

/// Document store capability consumed by the lifecycle pipeline.
///
/// Implementations only persist; they never derive fields or run hooks.
#[async_trait]
pub trait GroupStore: BaseStore {
    /// Persist a new document and return its assigned ID
    async fn save(&self, document: GroupDocument) -> std::result::Result<GroupId, StorageError>;

    /// Apply a partial update to the documents matching `filter`.
    ///
    /// Matching zero documents is not an error.
    async fn apply_update(
        &self,
        filter: &GroupFilter,
        update: &StoreUpdate,
        limit: MatchLimit,
    ) -> std::result::Result<UpdateResult, StorageError>;

    /// Delete the documents matching `filter`, returning them fully projected
    async fn delete(
        &self,
        filter: &GroupFilter,
        limit: MatchLimit,
    ) -> std::result::Result<Vec<Group>, StorageError>;

    /// Read documents matching `filter` in creation order
    async fn find(
        &self,
        filter: &GroupFilter,
        projection: &Projection,
        limit: Option<usize>,
    ) -> std::result::Result<Vec<Group>, StorageError>;

    /// Count documents matching `filter`
    async fn count(&self, filter: &GroupFilter) -> std::result::Result<usize, StorageError> {
        Ok(self.find(filter, &Projection::default(), None).await?.len())
    }
}
