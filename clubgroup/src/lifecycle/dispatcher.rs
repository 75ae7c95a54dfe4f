//! Lifecycle hook dispatcher
//!
//! Sequences the hooks of each mutation kind around the store call:
//!
//! | Kind   | Pre-hook                       | Post-hook                              |
//! |--------|--------------------------------|----------------------------------------|
//! | Create | search token derivation        | creation notification, observers       |
//! | Update | name gate (token synced after) | observers                              |
//! | Delete | none                           | cascade policy, observers              |
//! | Find   | reference expansion            | none                                   |
//!
//! Pre-hook failures abort the mutation before the store is touched. Post-hook
//! failures are published on the [`FailureChannel`] and never fail a mutation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cascade::CascadePolicy;
use super::derive::SearchTokenMaintainer;
use super::emitter::CreationNotifier;
use super::expansion::{FindQuery, ReferenceExpansion};
use super::failure::{FailureChannel, PostHookFailure};
use super::phase::{MutationKind, Phase, PhaseTracker};
use crate::hooks::{HookFailure, HookRegistry};
use crate::models::{Group, GroupPatch, NewGroup};
use crate::storage::{GroupFilter, GroupStore, MatchLimit, Projection, StoreUpdate, UpdateResult};
use crate::Result;

/// How many documents an update targets and what it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateScope {
    /// First matching document
    One,
    /// Every matching document
    Many,
    /// First matching document, returned as it is after the update
    FindAndUpdate,
}

impl UpdateScope {
    fn limit(self) -> MatchLimit {
        match self {
            UpdateScope::Many => MatchLimit::All,
            UpdateScope::One | UpdateScope::FindAndUpdate => MatchLimit::One,
        }
    }
}

/// How many documents a delete targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteScope {
    One,
    Many,
    /// First matching document, returned as it was before deletion
    FindAndDelete,
}

impl DeleteScope {
    fn limit(self) -> MatchLimit {
        match self {
            DeleteScope::Many => MatchLimit::All,
            DeleteScope::One | DeleteScope::FindAndDelete => MatchLimit::One,
        }
    }
}

/// A mutation intent
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create(NewGroup),
    UpdateByFilter {
        filter: GroupFilter,
        patch: GroupPatch,
        scope: UpdateScope,
    },
    DeleteByFilter {
        filter: GroupFilter,
        scope: DeleteScope,
    },
    Find(FindQuery),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Create,
            Mutation::UpdateByFilter { .. } => MutationKind::Update,
            Mutation::DeleteByFilter { .. } => MutationKind::Delete,
            Mutation::Find(_) => MutationKind::Find,
        }
    }
}

/// Result of a dispatched mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The persisted group, fully projected
    Created(Group),
    /// Primary update result, plus the updated document for find-and-update
    Updated(UpdateResult, Option<Group>),
    /// Deleted groups in the default projection
    Deleted(Vec<Group>),
    Found(Vec<Group>),
}

/// Runs mutations through their hook sequence
pub struct HookDispatcher {
    store: Arc<dyn GroupStore>,
    maintainer: SearchTokenMaintainer,
    emitter: CreationNotifier,
    cascade: Arc<dyn CascadePolicy>,
    expansion: Arc<dyn ReferenceExpansion>,
    observers: HookRegistry,
    failures: FailureChannel,
    cascade_timeout: Duration,
}

impl std::fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookDispatcher")
            .field("store", &self.store)
            .field("maintainer", &self.maintainer)
            .field("emitter", &self.emitter)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl HookDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn GroupStore>,
        maintainer: SearchTokenMaintainer,
        emitter: CreationNotifier,
        cascade: Arc<dyn CascadePolicy>,
        expansion: Arc<dyn ReferenceExpansion>,
        observers: HookRegistry,
        failures: FailureChannel,
        cascade_timeout: Duration,
    ) -> Self {
        Self {
            store,
            maintainer,
            emitter,
            cascade,
            expansion,
            observers,
            failures,
            cascade_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn GroupStore> {
        &self.store
    }

    pub fn maintainer(&self) -> &SearchTokenMaintainer {
        &self.maintainer
    }

    pub fn observers(&self) -> &HookRegistry {
        &self.observers
    }

    pub fn failures(&self) -> &FailureChannel {
        &self.failures
    }

    /// Run a mutation through its hook sequence
    pub async fn dispatch(&self, mutation: Mutation) -> Result<MutationOutcome> {
        let mut tracker = PhaseTracker::new(mutation.kind());

        let outcome = match mutation {
            Mutation::Create(group) => {
                MutationOutcome::Created(self.create(&mut tracker, group).await?)
            }
            Mutation::UpdateByFilter {
                filter,
                patch,
                scope,
            } => {
                let (result, document) = self.update(&mut tracker, &filter, patch, scope).await?;
                MutationOutcome::Updated(result, document)
            }
            Mutation::DeleteByFilter { filter, scope } => {
                MutationOutcome::Deleted(self.delete(&mut tracker, &filter, scope).await?)
            }
            Mutation::Find(query) => MutationOutcome::Found(self.find(&mut tracker, query).await?),
        };

        tracing::debug!(kind = %tracker.kind(), phases = ?tracker.history(), "mutation done");
        Ok(outcome)
    }

    async fn create(&self, tracker: &mut PhaseTracker, group: NewGroup) -> Result<Group> {
        group.validate()?;

        let document = self.maintainer.prepare(&group, Utc::now())?;
        tracker.advance(Phase::PreHooksRun)?;

        let id = self.store.save(document.clone()).await?;
        tracker.advance(Phase::Persisted)?;
        let created = document.into_group(id);
        tracing::info!("Group {} created in club {}", created.id, created.club);

        if let Err(failure) = self.emitter.emit(&created).await {
            self.failures.publish(failure);
        }
        self.publish_observer_failures(self.observers.execute_on_created(&created).await);
        tracker.advance(Phase::PostHooksRun)?;

        tracker.advance(Phase::Done)?;
        Ok(created)
    }

    async fn update(
        &self,
        tracker: &mut PhaseTracker,
        filter: &GroupFilter,
        patch: GroupPatch,
        scope: UpdateScope,
    ) -> Result<(UpdateResult, Option<Group>)> {
        let patch = patch.normalized();
        let renames = patch.patched_name().is_some();
        tracker.advance(Phase::ConditionalPreHook)?;

        let primary = self
            .store
            .apply_update(filter, &StoreUpdate::from_patch(patch.clone()), scope.limit())
            .await?;
        tracker.advance(Phase::Persisted)?;
        tracing::debug!(
            "Update matched {} group(s), renames: {}",
            primary.matched,
            renames
        );

        if renames {
            self.maintainer
                .sync_after_update(self.store.as_ref(), &primary, &patch)
                .await?;
        }

        let document = match scope {
            UpdateScope::FindAndUpdate if primary.matched > 0 => self
                .store
                .find(
                    &GroupFilter::by_ids(primary.ids.clone()),
                    &Projection::default(),
                    Some(1),
                )
                .await?
                .into_iter()
                .next(),
            _ => None,
        };

        self.publish_observer_failures(self.observers.execute_on_updated(&primary, &patch).await);
        tracker.advance(Phase::Done)?;
        Ok((primary, document))
    }

    async fn delete(
        &self,
        tracker: &mut PhaseTracker,
        filter: &GroupFilter,
        scope: DeleteScope,
    ) -> Result<Vec<Group>> {
        let deleted = self.store.delete(filter, scope.limit()).await?;
        tracker.advance(Phase::Persisted)?;
        tracing::debug!("Deleted {} group(s)", deleted.len());

        for group in &deleted {
            self.run_cascade(&group.id).await;
            self.publish_observer_failures(self.observers.execute_on_deleted(group).await);
        }
        tracker.advance(Phase::PostHook)?;

        tracker.advance(Phase::Done)?;
        let projection = Projection::default();
        Ok(deleted.into_iter().map(|g| projection.apply(g)).collect())
    }

    async fn find(&self, tracker: &mut PhaseTracker, mut query: FindQuery) -> Result<Vec<Group>> {
        self.expansion.before_find(&mut query).await?;
        tracker.advance(Phase::PreHooksRun)?;

        let groups = self
            .store
            .find(&query.filter, &query.projection, query.limit)
            .await?;
        tracker.advance(Phase::Queried)?;

        tracker.advance(Phase::Done)?;
        Ok(groups)
    }

    async fn run_cascade(&self, group_id: &str) {
        let failure = match tokio::time::timeout(
            self.cascade_timeout,
            self.cascade.on_deleted(group_id),
        )
        .await
        {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.cascade_timeout.as_millis()),
        };

        self.failures.publish(PostHookFailure::CascadeFailed {
            group_id: group_id.to_string(),
            reason: failure,
        });
    }

    fn publish_observer_failures(&self, failures: Vec<HookFailure>) {
        for failure in failures {
            self.failures.publish(failure.into());
        }
    }
}
