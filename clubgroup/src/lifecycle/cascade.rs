//! Cascade policy seam for dependent-entity cleanup on deletion
//!
//! Groups currently have no dependent entities, so the default policy does
//! nothing. A real policy must be idempotent: it may see the same ID again if
//! a caller retries a delete.

use async_trait::async_trait;

/// Error returned by a cascade policy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cascade cleanup failed: {0}")]
pub struct CascadeError(pub String);

/// Cleanup run once per deleted group, after the delete was persisted
#[async_trait]
pub trait CascadePolicy: Send + Sync {
    async fn on_deleted(&self, group_id: &str) -> Result<(), CascadeError>;
}

/// Policy that performs no cleanup
#[derive(Debug, Clone, Copy, Default)]
pub struct InertCascade;

#[async_trait]
impl CascadePolicy for InertCascade {
    async fn on_deleted(&self, group_id: &str) -> Result<(), CascadeError> {
        tracing::trace!("No dependents to clean up for group {}", group_id);
        Ok(())
    }
}
