//! In-process group store.
//!
//! Keeps documents in insertion order behind an async lock. Used for tests and
//! for embedding the repository without a database.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Group, GroupId};
use crate::storage::errors::StorageError;
use crate::storage::filters::{GroupFilter, MatchLimit, Projection};
use crate::storage::models::{GroupDocument, StoreUpdate, UpdateResult};
use crate::storage::traits::{BaseStore, GroupStore};

#[derive(Debug)]
pub struct MemoryGroupStore {
    groups: RwLock<Vec<Group>>,
    available: AtomicBool,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle availability; while unavailable every call fails with
    /// [`StorageError::Unavailable`]
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable(
                "memory group store is switched off".to_string(),
            ))
        }
    }
}

impl Default for MemoryGroupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseStore for MemoryGroupStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.groups.write().await.clear();
        Ok(())
    }

    async fn get_metadata(&self) -> Result<serde_json::Value, StorageError> {
        let count = self.groups.read().await.len();
        Ok(serde_json::json!({
            "type": "memory_group_store",
            "group_count": count
        }))
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn save(&self, document: GroupDocument) -> Result<GroupId, StorageError> {
        self.ensure_available()?;
        let id = Uuid::new_v4().simple().to_string();
        self.groups
            .write()
            .await
            .push(document.into_group(id.clone()));
        Ok(id)
    }

    async fn apply_update(
        &self,
        filter: &GroupFilter,
        update: &StoreUpdate,
        limit: MatchLimit,
    ) -> Result<UpdateResult, StorageError> {
        self.ensure_available()?;
        let mut groups = self.groups.write().await;
        let mut ids = Vec::new();

        for group in groups.iter_mut().filter(|g| filter.matches(g)) {
            update.apply_to(group);
            ids.push(group.id.clone());
            if limit == MatchLimit::One {
                break;
            }
        }

        Ok(UpdateResult::new(ids))
    }

    async fn delete(
        &self,
        filter: &GroupFilter,
        limit: MatchLimit,
    ) -> Result<Vec<Group>, StorageError> {
        self.ensure_available()?;
        let mut groups = self.groups.write().await;
        let mut deleted = Vec::new();
        let mut index = 0;

        while index < groups.len() {
            if filter.matches(&groups[index])
                && (limit == MatchLimit::All || deleted.is_empty())
            {
                deleted.push(groups.remove(index));
            } else {
                index += 1;
            }
        }

        Ok(deleted)
    }

    async fn find(
        &self,
        filter: &GroupFilter,
        projection: &Projection,
        limit: Option<usize>,
    ) -> Result<Vec<Group>, StorageError> {
        self.ensure_available()?;
        let groups = self.groups.read().await;
        Ok(groups
            .iter()
            .filter(|g| filter.matches(g))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .map(|g| projection.apply(g))
            .collect())
    }
}
