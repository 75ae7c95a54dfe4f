//! Search token upkeep
//!
//! The token is derived from `name` on create, and re-derived after any update
//! whose patch carries a name. Partial updates never rebuild the whole
//! document, so the re-derivation is a second, targeted write.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{GroupPatch, NewGroup};
use crate::normalize::{DerivationError, Normalizer};
use crate::storage::{GroupDocument, GroupFilter, GroupStore, MatchLimit, StoreUpdate, UpdateResult};
use crate::{ClubGroupError, Result};

/// Computes and writes the derived search token
#[derive(Debug, Clone)]
pub struct SearchTokenMaintainer {
    normalizer: Arc<dyn Normalizer>,
}

impl SearchTokenMaintainer {
    pub fn new(normalizer: Arc<dyn Normalizer>) -> Self {
        Self { normalizer }
    }

    /// Token for a name: normalized, then lowercased
    pub fn derive(&self, name: &str) -> std::result::Result<String, DerivationError> {
        Ok(self.normalizer.normalize(name)?.to_lowercase())
    }

    /// Build the document to persist for a new group
    pub fn prepare(
        &self,
        group: &NewGroup,
        created_at: DateTime<Utc>,
    ) -> std::result::Result<GroupDocument, DerivationError> {
        let name = group.name().to_string();
        let search_token = self.derive(&name)?;

        Ok(GroupDocument {
            photo: group.photo_or_placeholder(),
            name,
            search_token,
            description: group.description().to_string(),
            members: group.members().to_vec(),
            category: group.category(),
            is_main: group.is_main(),
            club: group.club().to_string(),
            created_at,
        })
    }

    /// Re-derive the token for the documents a primary update matched.
    ///
    /// Returns `None` when there was nothing to do. The write only touches
    /// documents whose name still equals the patched name, so a concurrent
    /// rename that landed in between keeps its own token.
    pub async fn sync_after_update(
        &self,
        store: &dyn GroupStore,
        primary: &UpdateResult,
        patch: &GroupPatch,
    ) -> Result<Option<UpdateResult>> {
        let Some(name) = patch.patched_name() else {
            return Ok(None);
        };
        if primary.matched == 0 {
            tracing::debug!("Update matched no groups; search token left alone");
            return Ok(None);
        }

        let token = self
            .derive(name)
            .map_err(|source| ClubGroupError::DerivationAfterUpdate {
                matched: primary.matched,
                source,
            })?;

        let target = GroupFilter::by_ids(primary.ids.clone()).name(name);
        let synced = store
            .apply_update(&target, &StoreUpdate::search_token_only(token), MatchLimit::All)
            .await?;

        if synced.matched < primary.matched {
            tracing::debug!(
                "Search token written to {} of {} groups; the rest were renamed concurrently",
                synced.matched,
                primary.matched
            );
        }

        Ok(Some(synced))
    }
}
