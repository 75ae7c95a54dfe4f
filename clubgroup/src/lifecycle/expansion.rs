//! Read-path pre-hook seam
//!
//! A [`ReferenceExpansion`] sees every find query before it reaches the store,
//! e.g. to widen the projection so member references can be resolved. The
//! default does nothing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::storage::{GroupFilter, Projection};

/// A find request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindQuery {
    pub filter: GroupFilter,
    pub projection: Projection,
    pub limit: Option<usize>,
}

impl FindQuery {
    pub fn new(filter: GroupFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Pre-hook for reads; an error aborts the read
#[async_trait]
pub trait ReferenceExpansion: Send + Sync {
    async fn before_find(&self, query: &mut FindQuery) -> Result<()>;
}

/// Expansion that leaves queries untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpansion;

#[async_trait]
impl ReferenceExpansion for NoExpansion {
    async fn before_find(&self, _query: &mut FindQuery) -> Result<()> {
        Ok(())
    }
}
