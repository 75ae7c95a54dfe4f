//! Traits for group lifecycle observers.
//!
//! Observers run after the built-in post-hooks of a mutation. They can only
//! observe: a failure is reported on the failure channel and never changes the
//! outcome of the mutation.
//!
//! # Examples
//!
//! ```no_run
//! use async_trait::async_trait;
//! use clubgroup::hooks::{GroupHook, HookResult};
//! use clubgroup::models::Group;
//!
//! #[derive(Debug)]
//! struct AuditHook;
//!
//! #[async_trait]
//! impl GroupHook for AuditHook {
//!     async fn on_group_created(&self, group: &Group) -> HookResult {
//!         println!("Group created: {}", group.id);
//!         HookResult::Continue
//!     }
//! }
//! ```

use crate::models::{Group, GroupPatch};
use crate::storage::UpdateResult;
use async_trait::async_trait;

/// Result type for hook execution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HookResult {
    /// The hook completed
    #[default]
    Continue,
    /// The hook could not do its work; contains a reason
    Failed(String),
}

/// Trait for group lifecycle observers
///
/// Every method has a default implementation that does nothing.
///
/// # Hook Execution
///
/// - Hooks are executed in priority order (higher priority first)
/// - Each hook has a configurable timeout (default: 5000ms)
/// - Failures and timeouts are reported, never propagated
#[async_trait]
pub trait GroupHook: Send + Sync + std::fmt::Debug {
    /// Called after a group is persisted and its creation notification was attempted
    async fn on_group_created(&self, _group: &Group) -> HookResult {
        HookResult::Continue
    }

    /// Called after an update-by-filter completed, including search token upkeep
    ///
    /// # Arguments
    /// * `result` - Matched count and IDs of the primary update
    /// * `patch` - The caller's patch as applied
    async fn on_group_updated(&self, result: &UpdateResult, patch: &GroupPatch) -> HookResult {
        let _ = (result, patch);
        HookResult::Continue
    }

    /// Called once per deleted group, after the cascade policy ran
    async fn on_group_deleted(&self, _group: &Group) -> HookResult {
        HookResult::Continue
    }

    /// Priority of this hook (higher runs first). Default is 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Timeout in milliseconds. Default is 5000.
    fn timeout_ms(&self) -> u64 {
        5000
    }

    /// Name used in logs and failure reports
    fn name(&self) -> &str {
        "anonymous_hook"
    }
}
