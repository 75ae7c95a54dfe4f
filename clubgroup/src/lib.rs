//! # Clubgroup
//!
//! Persistence for club groups with a lifecycle hook engine around every
//! mutation. Each group carries a derived `search_token` (its name with
//! Vietnamese diacritics folded and lowercased) that is kept in step with the
//! name on create and on every name-changing update.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clubgroup::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // In-memory store and notifier
//!     let groups = init_with_defaults().await?;
//!
//!     let group = groups
//!         .create(NewGroup::builder("Đội Văn Nghệ", "Music and dance", "club-1").member("user-1").build())
//!         .await?;
//!
//!     // Diacritic and case insensitive
//!     let found = groups.search("doi van", GroupFilter::new()).await?;
//!     assert_eq!(found[0].id, group.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Repository**: [`GroupRepository`](repository::GroupRepository), the single entry point
//! - **Lifecycle**: pre/post hooks per mutation kind, phase tracking, failure channel
//! - **Storage**: in-memory store and embedded SurrealDB (`surrealdb-embedded` feature)
//! - **Notify**: notification sinks for the creation notice (memory, SurrealDB, webhook)

pub mod config;
pub mod hooks;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod notify;
pub mod repository;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClubGroupConfig, NotificationBackend, NotificationConfig, StorageBackend};
use crate::notify::{Notifier, RetryPolicy, WebhookNotifier};
use crate::repository::GroupRepository;
use crate::storage::{GroupStore, MemoryGroupStore};

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::{init, init_with_defaults};

    pub use crate::config::{ClubGroupConfig, ConfigBuilder, ConfigLoader, LogLevel};

    pub use crate::models::{Category, Group, GroupId, GroupPatch, Member, MemberRole, NewGroup};

    pub use crate::repository::{GroupRepository, GroupRepositoryBuilder};

    pub use crate::lifecycle::{
        CascadePolicy, DeleteScope, FindQuery, Mutation, MutationOutcome, PostHookFailure,
        UpdateScope,
    };

    pub use crate::hooks::{GroupHook, HookResult};

    pub use crate::notify::{MemoryNotifier, Notification, Notifier};

    pub use crate::storage::{
        GroupFilter, GroupStore, MemoryGroupStore, Projection, StorageError, UpdateResult,
    };

    pub use crate::{ClubGroupError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for group operations
#[derive(Debug, thiserror::Error)]
pub enum ClubGroupError {
    /// A required field is missing or invalid; nothing was persisted
    #[error("Validation error: {0}")]
    Validation(String),

    /// The group was created without members, so no one could be notified
    #[error("Group {0} has no members to notify")]
    MissingRecipient(models::GroupId),

    /// The search token could not be derived; nothing was persisted
    #[error("Search token derivation failed: {0}")]
    DerivationFailure(#[from] normalize::DerivationError),

    /// The update was applied to `matched` groups but their search token is stale
    #[error("Update applied to {matched} group(s) but the search token was not refreshed: {source}")]
    DerivationAfterUpdate {
        matched: u64,
        #[source]
        source: normalize::DerivationError,
    },

    /// The document store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error from a notification sink
    #[error("Notification error: {0}")]
    Notification(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] logging::LogError),

    /// Broken internal invariant
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for ClubGroupError {
    fn from(err: config::ConfigError) -> Self {
        ClubGroupError::Configuration(err.to_string())
    }
}

impl From<notify::NotifyError> for ClubGroupError {
    fn from(err: notify::NotifyError) -> Self {
        ClubGroupError::Notification(err.to_string())
    }
}

/// Result type for group operations
pub type Result<T> = std::result::Result<T, ClubGroupError>;

/// Initialize a repository with the in-memory store and notifier
///
/// # Examples
///
/// ```rust
/// use clubgroup::prelude::*;
///
/// async fn example() -> Result<()> {
///     let groups = init_with_defaults().await?;
///     let chess = groups.create(NewGroup::builder("Chess", "Weekly games", "club-1").build()).await?;
///     assert!(groups.delete_by_id(&chess.id).await?);
///     Ok(())
/// }
/// ```
pub async fn init_with_defaults() -> Result<GroupRepository> {
    let config = config::ConfigBuilder::testing().build()?;
    init(config).await
}

/// Initialize a repository from configuration
///
/// Sets up logging (a subscriber installed earlier is left alone), opens the
/// configured store and notification sink, and wires them into a
/// [`GroupRepository`].
///
/// # Examples
///
/// ```rust,no_run
/// use clubgroup::prelude::*;
///
/// async fn example() -> Result<()> {
///     let config = ConfigLoader::load()?;
///     let groups = init(config).await?;
///     assert!(groups.health_check().await?);
///     Ok(())
/// }
/// ```
pub async fn init(config: ClubGroupConfig) -> Result<GroupRepository> {
    config::validate_config(&config)?;

    // A subscriber installed by the host application wins
    let _ = logging::init(&config.logging);

    let (store, notifier) = open_backends(&config).await?;
    tracing::info!(
        "Group repository ready (store: {:?}, notifications: {:?})",
        config.storage.backend,
        config.notifications.backend
    );

    GroupRepository::builder()
        .store(store)
        .notifier(notifier)
        .post_hook_timeout(Duration::from_millis(config.hooks.timeout_ms))
        .failure_capacity(config.hooks.failure_channel_capacity)
        .build()
}

async fn open_backends(
    config: &ClubGroupConfig,
) -> Result<(Arc<dyn GroupStore>, Arc<dyn Notifier>)> {
    match config.storage.backend {
        StorageBackend::Memory => {
            let store: Arc<dyn GroupStore> = Arc::new(MemoryGroupStore::new());
            let notifier = detached_notifier(&config.notifications)?;
            Ok((store, notifier))
        }
        #[cfg(feature = "surrealdb-embedded")]
        StorageBackend::SurrealDB => {
            let surreal = storage::create_surreal_store(&config.storage.surrealdb).await?;
            let notifier: Arc<dyn Notifier> = match config.notifications.backend {
                NotificationBackend::SurrealDB => {
                    Arc::new(notify::SurrealNotifier::from_store(&surreal))
                }
                _ => detached_notifier(&config.notifications)?,
            };
            Ok((Arc::new(surreal), notifier))
        }
        #[cfg(not(feature = "surrealdb-embedded"))]
        StorageBackend::SurrealDB => Err(ClubGroupError::Configuration(
            "SurrealDB storage requires the 'surrealdb-embedded' feature".to_string(),
        )),
    }
}

/// A notification sink that does not share the group store
fn detached_notifier(config: &NotificationConfig) -> Result<Arc<dyn Notifier>> {
    match config.backend {
        NotificationBackend::Memory => Ok(Arc::new(notify::MemoryNotifier::new())),
        NotificationBackend::Webhook => {
            let webhook = &config.webhook;
            let url = webhook.url.as_deref().ok_or_else(|| {
                ClubGroupError::Configuration("webhook notifications need a URL".to_string())
            })?;

            let mut notifier = WebhookNotifier::new(url)
                .with_method(webhook.method.as_str())
                .with_timeout(Duration::from_millis(webhook.timeout_ms))
                .with_retry_policy(RetryPolicy {
                    max_retries: webhook.max_retries,
                    initial_backoff_ms: webhook.initial_backoff_ms,
                    ..RetryPolicy::default()
                });
            for (key, value) in &webhook.headers {
                notifier = notifier.with_header(key.as_str(), value.as_str());
            }
            Ok(Arc::new(notifier))
        }
        NotificationBackend::SurrealDB => Err(ClubGroupError::Configuration(
            "SurrealDB notifications require SurrealDB storage".to_string(),
        )),
    }
}
