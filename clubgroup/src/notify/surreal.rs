//! Notification sink persisting to the `notification` table

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::{Connection, RecordId, Surreal};

use super::{Notification, Notifier, NotifyError};
use crate::storage::surreal::SurrealGroupStore;
use crate::storage::surreal::schema::NOTIFICATION_TABLE;

/// Stored notification as read back from SurrealDB
#[derive(Debug, Clone, Deserialize)]
pub struct StoredNotification {
    id: RecordId,
    pub content: String,
    pub link: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl StoredNotification {
    pub fn id(&self) -> String {
        self.id.key().to_string()
    }
}

/// Notifier writing into the same database as the group store
#[derive(Debug, Clone)]
pub struct SurrealNotifier<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    client: Surreal<C>,
}

impl<C> SurrealNotifier<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    /// Wrap a client whose namespace, database and schema are already set up
    pub fn new(client: Surreal<C>) -> Self {
        Self { client }
    }

    /// Share the client of a group store
    pub fn from_store(store: &SurrealGroupStore<C>) -> Self {
        Self::new(store.client().clone())
    }

    /// Notifications addressed to `user`, oldest first
    pub async fn list_for_user(&self, user: &str) -> Result<Vec<StoredNotification>, NotifyError> {
        let query = format!(
            "SELECT * FROM {} WHERE user = $user ORDER BY created_at ASC",
            NOTIFICATION_TABLE
        );

        let mut response = self
            .client
            .query(query)
            .bind(("user", user.to_string()))
            .await
            .map_err(|e| NotifyError::Storage(format!("Failed to list notifications: {}", e)))?;

        response
            .take(0)
            .map_err(|e| NotifyError::Storage(format!("Failed to extract notifications: {}", e)))
    }
}

#[async_trait]
impl<C> Notifier for SurrealNotifier<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    async fn create(&self, notification: Notification) -> Result<(), NotifyError> {
        let query = format!(
            "CREATE {} CONTENT {{ content: $content, link: $link, user: $user, created_at: time::now() }}",
            NOTIFICATION_TABLE
        );

        let mut response = self
            .client
            .query(query)
            .bind(("content", notification.content))
            .bind(("link", notification.link))
            .bind(("user", notification.recipient))
            .await
            .map_err(|e| NotifyError::Storage(format!("Failed to create notification: {}", e)))?;

        let created: Vec<StoredNotification> = response
            .take(0)
            .map_err(|e| NotifyError::Storage(format!("Failed to extract notification: {}", e)))?;

        match created.first() {
            Some(stored) => {
                tracing::debug!("Stored notification {} for {}", stored.id(), stored.user);
                Ok(())
            }
            None => Err(NotifyError::Storage(
                "Notification creation returned no record".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "surrealdb"
    }
}
