//! Hook registry for group lifecycle observers
//!
//! The registry handles:
//! - Hook registration and unregistration
//! - Priority-based hook ordering
//! - Timeout enforcement for individual hooks
//! - Collecting failures instead of propagating them

use super::traits::{GroupHook, HookResult};
use crate::models::{Group, GroupPatch};
use crate::storage::UpdateResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Entry in the hook registry
#[derive(Debug)]
struct HookEntry {
    hook: Arc<dyn GroupHook>,
    priority: i32,
}

/// Lifecycle event delivered to observers
#[derive(Debug, Clone, Copy)]
pub enum GroupEvent<'a> {
    Created(&'a Group),
    Updated {
        result: &'a UpdateResult,
        patch: &'a GroupPatch,
    },
    Deleted(&'a Group),
}

impl GroupEvent<'_> {
    /// Event name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            GroupEvent::Created(_) => "group.created",
            GroupEvent::Updated { .. } => "group.updated",
            GroupEvent::Deleted(_) => "group.deleted",
        }
    }
}

/// Why a single observer did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookFailureKind {
    Failed(String),
    TimedOut(u64),
}

/// A failed or timed-out observer invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub hook: String,
    pub event: &'static str,
    pub kind: HookFailureKind,
}

/// Registry for managing group lifecycle observers
///
/// Hooks are executed in priority order (higher priority first). The registry
/// is cheap to clone and safe to share across tasks.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    /// Registered hooks, kept sorted by priority
    hooks: Arc<RwLock<Vec<HookEntry>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new hook
    pub async fn register(&self, hook: Arc<dyn GroupHook>) {
        let priority = hook.priority();
        let name = hook.name().to_string();
        let mut hooks = self.hooks.write().await;

        hooks.push(HookEntry { hook, priority });

        // Highest priority first, ties broken by name for a stable order
        hooks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.hook.name().cmp(b.hook.name()))
        });

        debug!("Hook registered: {} (priority: {})", name, priority);
    }

    /// Remove every hook with the given name, returning how many were removed
    pub async fn unregister(&self, name: &str) -> usize {
        let mut hooks = self.hooks.write().await;
        let before = hooks.len();
        hooks.retain(|entry| entry.hook.name() != name);
        let removed = before - hooks.len();
        if removed > 0 {
            debug!("Hook unregistered: {} ({} entries)", name, removed);
        }
        removed
    }

    /// Run every hook for `event`, returning the invocations that failed
    pub async fn execute(&self, event: GroupEvent<'_>) -> Vec<HookFailure> {
        let hooks = self.hooks.read().await;
        let mut failures = Vec::new();

        for entry in hooks.iter() {
            let hook = entry.hook.as_ref();
            let timeout_ms = hook.timeout_ms();
            let name = hook.name();

            let future = async {
                match event {
                    GroupEvent::Created(group) => hook.on_group_created(group).await,
                    GroupEvent::Updated { result, patch } => {
                        hook.on_group_updated(result, patch).await
                    }
                    GroupEvent::Deleted(group) => hook.on_group_deleted(group).await,
                }
            };

            match tokio::time::timeout(Duration::from_millis(timeout_ms), future).await {
                Ok(HookResult::Continue) => {
                    debug!("Hook '{}' completed {}", name, event.name());
                }
                Ok(HookResult::Failed(reason)) => {
                    warn!("Hook '{}' failed on {}: {}", name, event.name(), reason);
                    failures.push(HookFailure {
                        hook: name.to_string(),
                        event: event.name(),
                        kind: HookFailureKind::Failed(reason),
                    });
                }
                Err(_) => {
                    warn!(
                        "Hook '{}' timed out after {}ms on {}",
                        name,
                        timeout_ms,
                        event.name()
                    );
                    failures.push(HookFailure {
                        hook: name.to_string(),
                        event: event.name(),
                        kind: HookFailureKind::TimedOut(timeout_ms),
                    });
                }
            }
        }

        failures
    }

    pub async fn execute_on_created(&self, group: &Group) -> Vec<HookFailure> {
        self.execute(GroupEvent::Created(group)).await
    }

    pub async fn execute_on_updated(
        &self,
        result: &UpdateResult,
        patch: &GroupPatch,
    ) -> Vec<HookFailure> {
        self.execute(GroupEvent::Updated { result, patch }).await
    }

    pub async fn execute_on_deleted(&self, group: &Group) -> Vec<HookFailure> {
        self.execute(GroupEvent::Deleted(group)).await
    }

    /// Get the number of registered hooks
    pub async fn hook_count(&self) -> usize {
        self.hooks.read().await.len()
    }

    /// Clear all registered hooks
    pub async fn clear(&self) {
        self.hooks.write().await.clear();
        debug!("All hooks cleared from registry");
    }

    /// Hook names and priorities in execution order
    pub async fn list_hooks(&self) -> Vec<(String, i32)> {
        self.hooks
            .read()
            .await
            .iter()
            .map(|entry| (entry.hook.name().to_string(), entry.priority))
            .collect()
    }
}
