//! Creation notification post-hook

use std::sync::Arc;
use std::time::Duration;

use super::failure::PostHookFailure;
use crate::models::Group;
use crate::notify::{Notification, Notifier};

/// Message sent to the first member of a newly created group
pub const CREATION_MESSAGE: &str = "Your Group is created";

/// Notifies the first member of a new group
#[derive(Clone)]
pub struct CreationNotifier {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl std::fmt::Debug for CreationNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreationNotifier")
            .field("notifier", &self.notifier.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CreationNotifier {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// Notification for a persisted group, or `MissingRecipient` when it has no members
    pub fn notification_for(group: &Group) -> Result<Notification, PostHookFailure> {
        let recipient = group
            .members
            .as_deref()
            .and_then(|members| members.first())
            .ok_or_else(|| PostHookFailure::MissingRecipient {
                group_id: group.id.clone(),
            })?;

        Ok(Notification::new(
            CREATION_MESSAGE,
            group.id.clone(),
            recipient.user.clone(),
        ))
    }

    /// Submit the creation notification; the group is already persisted
    pub async fn emit(&self, group: &Group) -> Result<Notification, PostHookFailure> {
        let notification = Self::notification_for(group)?;

        match tokio::time::timeout(self.timeout, self.notifier.create(notification.clone())).await
        {
            Ok(Ok(())) => {
                tracing::debug!(
                    "Creation notification for group {} sent to {} via {}",
                    group.id,
                    notification.recipient,
                    self.notifier.name()
                );
                Ok(notification)
            }
            Ok(Err(e)) => Err(PostHookFailure::NotificationFailed {
                group_id: group.id.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(PostHookFailure::NotificationFailed {
                group_id: group.id.clone(),
                reason: format!("timed out after {}ms", self.timeout.as_millis()),
            }),
        }
    }
}
