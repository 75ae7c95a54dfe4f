//! Schema initialization for the SurrealDB group store

use crate::storage::errors::StorageError;
use surrealdb::{Connection, Surreal};

/// Table holding club groups
pub const GROUP_TABLE: &str = "club_group";

/// Table holding notifications written by the store-backed notifier
pub const NOTIFICATION_TABLE: &str = "notification";

/// Initialize tables, analyzer and indexes. Safe to run on every start.
pub async fn initialize_schema<C>(client: &Surreal<C>) -> Result<(), StorageError>
where
    C: Connection,
{
    // Search tokens are already folded; the analyzer only splits and guards case
    let analyzer_query = r#"
        DEFINE ANALYZER IF NOT EXISTS group_analyzer
            TOKENIZERS class, blank
            FILTERS lowercase, ascii
            COMMENT "Analyzer for normalized group search tokens";
    "#;

    let group_table_query = r#"
        DEFINE TABLE IF NOT EXISTS club_group SCHEMALESS
        COMMENT "Stores club sub-groups";

        DEFINE FIELD IF NOT EXISTS name ON club_group TYPE string;
        DEFINE FIELD IF NOT EXISTS search_token ON club_group TYPE string;
        DEFINE FIELD IF NOT EXISTS description ON club_group TYPE string;
        DEFINE FIELD IF NOT EXISTS photo ON club_group TYPE string;
        DEFINE FIELD IF NOT EXISTS members ON club_group TYPE array<object> DEFAULT [];
        DEFINE FIELD IF NOT EXISTS category ON club_group TYPE string DEFAULT "Default";
        DEFINE FIELD IF NOT EXISTS is_main ON club_group TYPE bool DEFAULT false;
        DEFINE FIELD IF NOT EXISTS club ON club_group TYPE string;
        DEFINE FIELD IF NOT EXISTS created_at ON club_group TYPE datetime DEFAULT time::now() READONLY;

        DEFINE INDEX IF NOT EXISTS club_group_club_idx ON club_group FIELDS club;
        DEFINE INDEX IF NOT EXISTS club_group_name_idx ON club_group FIELDS name;
        DEFINE INDEX IF NOT EXISTS club_group_created_at_idx ON club_group FIELDS created_at;

        DEFINE INDEX IF NOT EXISTS club_group_search_ft ON club_group
            FIELDS search_token
            SEARCH ANALYZER group_analyzer BM25
            COMMENT "Full-text search on the derived search token";
    "#;

    let notification_table_query = r#"
        DEFINE TABLE IF NOT EXISTS notification SCHEMALESS
        COMMENT "Stores user notifications";

        DEFINE FIELD IF NOT EXISTS content ON notification TYPE string;
        DEFINE FIELD IF NOT EXISTS link ON notification TYPE string;
        DEFINE FIELD IF NOT EXISTS user ON notification TYPE string;
        DEFINE FIELD IF NOT EXISTS created_at ON notification TYPE datetime DEFAULT time::now();

        DEFINE INDEX IF NOT EXISTS notification_user_idx ON notification FIELDS user;
    "#;

    execute_schema_query(client, analyzer_query, "group analyzer").await?;
    execute_schema_query(client, group_table_query, "club_group table").await?;
    execute_schema_query(client, notification_table_query, "notification table").await?;

    tracing::info!("Club group schema initialized");
    Ok(())
}

/// Execute a schema query and handle errors
async fn execute_schema_query<C>(
    client: &Surreal<C>,
    query: &str,
    description: &str,
) -> Result<(), StorageError>
where
    C: Connection,
{
    client
        .query(query)
        .await
        .map_err(|e| StorageError::Query(format!("Failed to create {}: {}", description, e)))?;

    tracing::debug!("Created {} successfully", description);
    Ok(())
}
