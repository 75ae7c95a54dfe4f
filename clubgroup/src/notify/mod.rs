//! Notification capability consumed by the creation post-hook
//!
//! A [`Notifier`] accepts a [`Notification`] and either delivers it or reports
//! why it could not. Delivery is best-effort from the repository's point of
//! view: failures are reported on the failure channel, never to the caller of
//! the mutation that triggered them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[cfg(feature = "surrealdb-embedded")]
pub mod surreal;
pub mod webhook;

#[cfg(feature = "surrealdb-embedded")]
pub use surreal::SurrealNotifier;
pub use webhook::{RetryPolicy, WebhookNotifier};

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Message shown to the user
    pub content: String,

    /// What the notification points at (a group ID for creation notices)
    pub link: String,

    /// User receiving the notification
    pub recipient: String,
}

impl Notification {
    pub fn new<C, L, R>(content: C, link: L, recipient: R) -> Self
    where
        C: Into<String>,
        L: Into<String>,
        R: Into<String>,
    {
        Self {
            content: content.into(),
            link: link.into(),
            recipient: recipient.into(),
        }
    }
}

/// Error returned by a notification sink
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// The sink could not be reached or the request failed in transit
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The remote end answered with a non-success status
    #[error("Rejected with HTTP status {status}")]
    Rejected { status: u16 },

    /// The sink's backing store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The notification could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Submit a notification
    async fn create(&self, notification: Notification) -> Result<(), NotifyError>;

    /// Name used in logs
    fn name(&self) -> &str {
        "notifier"
    }
}

/// In-memory notification sink
///
/// Records every notification it accepts. Can be switched into a failing mode
/// to exercise the failure channel.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: RwLock<Vec<Notification>>,
    failing: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create` fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Notifications accepted so far, in submission order
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }

    /// Notifications addressed to one user
    pub async fn sent_to(&self, recipient: &str) -> Vec<Notification> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn create(&self, notification: Notification) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery(
                "memory notifier is switched to failing".to_string(),
            ));
        }
        tracing::debug!(
            "Recorded notification for {} -> {}",
            notification.recipient,
            notification.link
        );
        self.sent.write().await.push(notification);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier
            .create(Notification::new("first", "g1", "u1"))
            .await
            .unwrap();
        notifier
            .create(Notification::new("second", "g2", "u2"))
            .await
            .unwrap();

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].content, "first");
        assert_eq!(notifier.sent_to("u2").await[0].link, "g2");
    }

    #[tokio::test]
    async fn test_memory_notifier_failing_mode() {
        let notifier = MemoryNotifier::new();
        notifier.set_failing(true);

        let err = notifier
            .create(Notification::new("x", "g1", "u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Delivery(_)));
        assert!(notifier.sent().await.is_empty());
    }
}
