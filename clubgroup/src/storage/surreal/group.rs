//! Group operations for the SurrealDB store

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::method::Query;
use surrealdb::{Connection, RecordId};
use uuid::Uuid;

use super::SurrealGroupStore;
use super::schema::GROUP_TABLE;
use crate::models::{Category, Group, GroupId, Member};
use crate::storage::errors::StorageError;
use crate::storage::filters::{GroupFilter, MatchLimit, Projection};
use crate::storage::models::{GroupDocument, StoreUpdate, UpdateResult};
use crate::storage::traits::{BaseStore, GroupStore};

/// Internal representation of a group record in SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SurrealGroup {
    id: RecordId,
    name: String,
    #[serde(default)]
    search_token: Option<String>,
    description: String,
    photo: String,
    #[serde(default)]
    members: Vec<Member>,
    category: Category,
    is_main: bool,
    club: String,
    created_at: DateTime<Utc>,
}

impl From<SurrealGroup> for Group {
    fn from(record: SurrealGroup) -> Self {
        Group {
            id: record.id.key().to_string(),
            name: record.name,
            search_token: record.search_token,
            description: record.description,
            photo: record.photo,
            members: Some(record.members),
            category: record.category,
            is_main: record.is_main,
            club: record.club,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordRef {
    id: RecordId,
}

fn record_id(id: &str) -> RecordId {
    RecordId::from((GROUP_TABLE, id))
}

/// Render the WHERE clause for a filter, or an empty string for "match all"
fn where_clause(filter: &GroupFilter) -> String {
    let mut conditions = Vec::new();
    if filter.ids.is_some() {
        conditions.push("id IN $ids");
    }
    if filter.club.is_some() {
        conditions.push("club = $club");
    }
    if filter.name.is_some() {
        conditions.push("name = $name");
    }
    if filter.category.is_some() {
        conditions.push("category = $category");
    }
    if filter.is_main.is_some() {
        conditions.push("is_main = $is_main");
    }
    if filter.text.is_some() {
        conditions.push("search_token @@ $text");
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Bind the parameters referenced by [`where_clause`]
fn bind_filter<'r, C>(mut query: Query<'r, C>, filter: &GroupFilter) -> Query<'r, C>
where
    C: Connection,
{
    if let Some(ids) = &filter.ids {
        let ids: Vec<RecordId> = ids.iter().map(|id| record_id(id)).collect();
        query = query.bind(("ids", ids));
    }
    if let Some(club) = &filter.club {
        query = query.bind(("club", club.clone()));
    }
    if let Some(name) = &filter.name {
        query = query.bind(("name", name.clone()));
    }
    if let Some(category) = filter.category {
        query = query.bind(("category", category));
    }
    if let Some(is_main) = filter.is_main {
        query = query.bind(("is_main", is_main));
    }
    if let Some(text) = &filter.text {
        query = query.bind(("text", text.clone()));
    }
    query
}

impl<C> SurrealGroupStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    /// Resolve the records a mutation will touch, in creation order.
    ///
    /// Mutations then target these IDs, so a limit of one and the full-text
    /// operator never have to be combined with UPDATE or DELETE.
    async fn matching_ids(
        &self,
        filter: &GroupFilter,
        limit: MatchLimit,
    ) -> Result<Vec<GroupId>, StorageError> {
        let limit_clause = match limit {
            MatchLimit::One => " LIMIT 1",
            MatchLimit::All => "",
        };
        let sql = format!(
            "SELECT id, created_at FROM {}{} ORDER BY created_at ASC{}",
            GROUP_TABLE,
            where_clause(filter),
            limit_clause
        );

        let mut response = bind_filter(self.client.query(sql), filter)
            .await
            .map_err(|e| client_error("Failed to resolve groups", e))?;

        let refs: Vec<RecordRef> = response
            .take(0)
            .map_err(|e| client_error("Failed to extract group ids", e))?;

        Ok(refs.into_iter().map(|r| r.id.key().to_string()).collect())
    }

    /// Narrow a filter to already-resolved IDs, keeping its field criteria
    fn narrowed(filter: &GroupFilter, ids: Vec<GroupId>) -> GroupFilter {
        GroupFilter {
            ids: Some(ids),
            text: None,
            ..filter.clone()
        }
    }
}

/// Wrap a client error, telling a lost connection apart from a failed query
fn client_error(context: &str, error: surrealdb::Error) -> StorageError {
    let message = format!("{}: {}", context, error);
    if is_connection_failure(&error.to_string()) {
        StorageError::Connection(message)
    } else {
        StorageError::Query(message)
    }
}

/// An uninitialised client, a closed engine channel or a dropped remote
/// connection all mean the store is out of reach
fn is_connection_failure(message: &str) -> bool {
    let message = message.to_lowercase();
    [
        "connection",
        "channel closed",
        "channel is closed",
        "not connected",
        "disconnected",
    ]
    .iter()
    .any(|marker| message.contains(marker))
}

#[async_trait]
impl<C> BaseStore for SurrealGroupStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    async fn health_check(&self) -> Result<bool, StorageError> {
        match self.client.query("INFO FOR DB").await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("SurrealDB health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.client
            .query(format!("DELETE FROM {}", GROUP_TABLE))
            .await
            .map_err(|e| client_error("Failed to clear groups", e))?;
        Ok(())
    }

    async fn get_metadata(&self) -> Result<serde_json::Value, StorageError> {
        Ok(serde_json::json!({
            "type": "surrealdb_group_store",
            "namespace": self.namespace,
            "database": self.database,
            "table": GROUP_TABLE
        }))
    }

    async fn close(&self) -> Result<(), StorageError> {
        // The embedded engine is released when the last client handle drops
        Ok(())
    }
}

#[async_trait]
impl<C> GroupStore for SurrealGroupStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    async fn save(&self, document: GroupDocument) -> Result<GroupId, StorageError> {
        let id = Uuid::new_v4().simple().to_string();

        let query = r#"
            CREATE $id CONTENT {
                name: $name,
                search_token: $search_token,
                description: $description,
                photo: $photo,
                members: $members,
                category: $category,
                is_main: $is_main,
                club: $club,
                created_at: type::datetime($created_at)
            }
        "#;

        let mut response = self
            .client
            .query(query)
            .bind(("id", record_id(&id)))
            .bind(("name", document.name))
            .bind(("search_token", document.search_token))
            .bind(("description", document.description))
            .bind(("photo", document.photo))
            .bind(("members", document.members))
            .bind(("category", document.category))
            .bind(("is_main", document.is_main))
            .bind(("club", document.club))
            .bind(("created_at", document.created_at.to_rfc3339()))
            .await
            .map_err(|e| client_error("Failed to create group", e))?;

        let created: Vec<SurrealGroup> = response
            .take(0)
            .map_err(|e| client_error("Failed to extract created group", e))?;

        match created.into_iter().next() {
            Some(record) => {
                let group = Group::from(record);
                tracing::debug!("Created group {} ({})", group.id, group.name);
                Ok(group.id)
            }
            None => Err(StorageError::Internal(
                "Group creation returned no record".to_string(),
            )),
        }
    }

    async fn apply_update(
        &self,
        filter: &GroupFilter,
        update: &StoreUpdate,
        limit: MatchLimit,
    ) -> Result<UpdateResult, StorageError> {
        let targets = self.matching_ids(filter, limit).await?;
        if targets.is_empty() {
            return Ok(UpdateResult::default());
        }

        // Field criteria are re-checked at write time; documents that stopped
        // matching since the lookup are left alone.
        let narrowed = Self::narrowed(filter, targets);
        let sql = format!(
            "UPDATE {} MERGE $patch{} RETURN AFTER",
            GROUP_TABLE,
            where_clause(&narrowed)
        );

        let patch = update.to_merge_value()?;
        let query = self.client.query(sql).bind(("patch", patch));
        let mut response = bind_filter(query, &narrowed)
            .await
            .map_err(|e| client_error("Failed to update groups", e))?;

        let updated: Vec<SurrealGroup> = response
            .take(0)
            .map_err(|e| client_error("Failed to extract updated groups", e))?;

        let mut updated: Vec<Group> = updated.into_iter().map(Group::from).collect();
        updated.sort_by_key(|g| g.created_at);
        Ok(UpdateResult::new(updated.into_iter().map(|g| g.id).collect()))
    }

    async fn delete(
        &self,
        filter: &GroupFilter,
        limit: MatchLimit,
    ) -> Result<Vec<Group>, StorageError> {
        let targets = self.matching_ids(filter, limit).await?;
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let narrowed = Self::narrowed(filter, targets);
        let sql = format!(
            "DELETE {}{} RETURN BEFORE",
            GROUP_TABLE,
            where_clause(&narrowed)
        );

        let mut response = bind_filter(self.client.query(sql), &narrowed)
            .await
            .map_err(|e| client_error("Failed to delete groups", e))?;

        let deleted: Vec<SurrealGroup> = response
            .take(0)
            .map_err(|e| client_error("Failed to extract deleted groups", e))?;

        let mut deleted: Vec<Group> = deleted.into_iter().map(Group::from).collect();
        deleted.sort_by_key(|g| g.created_at);
        Ok(deleted)
    }

    async fn find(
        &self,
        filter: &GroupFilter,
        projection: &Projection,
        limit: Option<usize>,
    ) -> Result<Vec<Group>, StorageError> {
        let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY created_at ASC{}",
            GROUP_TABLE,
            where_clause(filter),
            limit_clause
        );

        let mut response = bind_filter(self.client.query(sql), filter)
            .await
            .map_err(|e| client_error("Failed to find groups", e))?;

        let records: Vec<SurrealGroup> = response
            .take(0)
            .map_err(|e| client_error("Failed to extract groups", e))?;

        Ok(records
            .into_iter()
            .map(|record| projection.apply(Group::from(record)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_for_empty_filter() {
        assert_eq!(where_clause(&GroupFilter::new()), "");
    }

    #[test]
    fn test_where_clause_joins_set_criteria() {
        let filter = GroupFilter::by_id("g1").club("c1").text("chess");
        assert_eq!(
            where_clause(&filter),
            " WHERE id IN $ids AND club = $club AND search_token @@ $text"
        );
    }

    #[test]
    fn test_narrowed_drops_text_and_replaces_ids() {
        let filter = GroupFilter::new().club("c1").text("chess");
        let narrowed = SurrealGroupStore::<surrealdb::engine::local::Db>::narrowed(
            &filter,
            vec!["a".to_string()],
        );
        assert_eq!(narrowed.ids, Some(vec!["a".to_string()]));
        assert_eq!(narrowed.club.as_deref(), Some("c1"));
        assert!(narrowed.text.is_none());
    }

    #[test]
    fn test_connection_failures_are_told_apart() {
        assert!(is_connection_failure("Connection uninitialised"));
        assert!(is_connection_failure("internal error: channel closed"));
        assert!(!is_connection_failure("Parse error: unexpected token `FORM`"));
        assert!(!is_connection_failure("Found NONE for field `name`"));
    }

    #[tokio::test]
    async fn test_unconnected_client_reports_store_unavailable() {
        let store = SurrealGroupStore {
            client: surrealdb::Surreal::<surrealdb::engine::local::Db>::init(),
            namespace: "test".to_string(),
            database: "unreachable".to_string(),
        };

        let err = store
            .find(&GroupFilter::new(), &Projection::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)), "got {err:?}");
        assert!(err.is_unavailable());
        assert!(matches!(
            crate::ClubGroupError::from(err),
            crate::ClubGroupError::StoreUnavailable(_)
        ));

        let err = store.delete(&GroupFilter::new(), MatchLimit::All).await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)), "got {err:?}");
    }
}
