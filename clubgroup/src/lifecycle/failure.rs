//! Observability channel for post-hook failures
//!
//! Post-hooks run after the store accepted a mutation, so their failures can
//! never fail it. They are logged and published here instead.

use tokio::sync::broadcast;

use crate::ClubGroupError;
use crate::hooks::{HookFailure, HookFailureKind};
use crate::models::GroupId;

/// A post-hook that did not complete
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostHookFailure {
    /// A group was created without members, so nobody could be notified
    #[error("group {group_id} has no members to notify")]
    MissingRecipient { group_id: GroupId },

    #[error("creation notification for group {group_id} failed: {reason}")]
    NotificationFailed { group_id: GroupId, reason: String },

    #[error("cascade policy failed for group {group_id}: {reason}")]
    CascadeFailed { group_id: GroupId, reason: String },

    #[error("observer '{hook}' failed on {event}: {reason}")]
    ObserverFailed {
        hook: String,
        event: &'static str,
        reason: String,
    },

    #[error("observer '{hook}' timed out after {timeout_ms}ms on {event}")]
    ObserverTimedOut {
        hook: String,
        event: &'static str,
        timeout_ms: u64,
    },
}

impl From<HookFailure> for PostHookFailure {
    fn from(failure: HookFailure) -> Self {
        match failure.kind {
            HookFailureKind::Failed(reason) => PostHookFailure::ObserverFailed {
                hook: failure.hook,
                event: failure.event,
                reason,
            },
            HookFailureKind::TimedOut(timeout_ms) => PostHookFailure::ObserverTimedOut {
                hook: failure.hook,
                event: failure.event,
                timeout_ms,
            },
        }
    }
}

impl From<PostHookFailure> for ClubGroupError {
    fn from(failure: PostHookFailure) -> Self {
        match failure {
            PostHookFailure::MissingRecipient { group_id } => {
                ClubGroupError::MissingRecipient(group_id)
            }
            PostHookFailure::NotificationFailed { .. } => {
                ClubGroupError::Notification(failure.to_string())
            }
            other => ClubGroupError::Internal(other.to_string()),
        }
    }
}

/// Broadcast sender for [`PostHookFailure`] events
#[derive(Debug, Clone)]
pub struct FailureChannel {
    sender: broadcast::Sender<PostHookFailure>,
}

impl FailureChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// New receiver seeing every failure published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PostHookFailure> {
        self.sender.subscribe()
    }

    /// Log a failure and publish it to current subscribers
    pub fn publish(&self, failure: PostHookFailure) {
        tracing::warn!(failure = %failure, "post-hook failure");
        // No subscribers is fine; the log line above is the record
        let _ = self.sender.send(failure);
    }
}

impl Default for FailureChannel {
    fn default() -> Self {
        Self::new(64)
    }
}
