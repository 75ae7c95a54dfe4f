//! Group repository
//!
//! [`GroupRepository`] is the entry point for every group mutation. It is
//! built from explicit collaborators (store, normalizer, notifier and the
//! optional seams) and routes every call through the [`HookDispatcher`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::hooks::{GroupHook, HookRegistry};
use crate::lifecycle::{
    CascadePolicy, CreationNotifier, DeleteScope, FailureChannel, FindQuery, HookDispatcher,
    InertCascade, Mutation, MutationOutcome, NoExpansion, PostHookFailure, ReferenceExpansion,
    SearchTokenMaintainer, UpdateScope,
};
use crate::models::{Group, GroupPatch, NewGroup};
use crate::normalize::{Normalizer, VietnameseFolding};
use crate::notify::Notifier;
use crate::storage::{GroupFilter, GroupStore, Projection, UpdateResult, search_terms};
use crate::{ClubGroupError, Result};

/// Repository for club groups
#[derive(Debug, Clone)]
pub struct GroupRepository {
    dispatcher: Arc<HookDispatcher>,
}

impl GroupRepository {
    pub fn builder() -> GroupRepositoryBuilder {
        GroupRepositoryBuilder::default()
    }

    /// Run any mutation through the hook engine
    pub async fn dispatch(&self, mutation: Mutation) -> Result<MutationOutcome> {
        self.dispatcher.dispatch(mutation).await
    }

    /// Create a group; the search token is derived from its name
    pub async fn create(&self, group: NewGroup) -> Result<Group> {
        match self.dispatch(Mutation::Create(group)).await? {
            MutationOutcome::Created(group) => Ok(group),
            other => Err(unexpected("create", &other)),
        }
    }

    /// Update the first group matching `filter`
    pub async fn update_one(&self, filter: GroupFilter, patch: GroupPatch) -> Result<UpdateResult> {
        self.update(filter, patch, UpdateScope::One)
            .await
            .map(|(result, _)| result)
    }

    /// Update every group matching `filter`
    pub async fn update_many(
        &self,
        filter: GroupFilter,
        patch: GroupPatch,
    ) -> Result<UpdateResult> {
        self.update(filter, patch, UpdateScope::Many)
            .await
            .map(|(result, _)| result)
    }

    pub async fn update_by_id(&self, id: &str, patch: GroupPatch) -> Result<UpdateResult> {
        self.update_one(GroupFilter::by_id(id), patch).await
    }

    /// Update the first group matching `filter` and return it as updated
    pub async fn find_one_and_update(
        &self,
        filter: GroupFilter,
        patch: GroupPatch,
    ) -> Result<Option<Group>> {
        self.update(filter, patch, UpdateScope::FindAndUpdate)
            .await
            .map(|(_, group)| group)
    }

    async fn update(
        &self,
        filter: GroupFilter,
        patch: GroupPatch,
        scope: UpdateScope,
    ) -> Result<(UpdateResult, Option<Group>)> {
        let mutation = Mutation::UpdateByFilter {
            filter,
            patch,
            scope,
        };
        match self.dispatch(mutation).await? {
            MutationOutcome::Updated(result, group) => Ok((result, group)),
            other => Err(unexpected("update", &other)),
        }
    }

    /// Delete the first group matching `filter`, returning the deleted count
    pub async fn delete_one(&self, filter: GroupFilter) -> Result<u64> {
        Ok(self.delete(filter, DeleteScope::One).await?.len() as u64)
    }

    pub async fn delete_many(&self, filter: GroupFilter) -> Result<u64> {
        Ok(self.delete(filter, DeleteScope::Many).await?.len() as u64)
    }

    /// Delete a group by ID; `false` when it did not exist
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        Ok(self.delete_one(GroupFilter::by_id(id)).await? > 0)
    }

    /// Delete the first group matching `filter` and return it
    pub async fn find_one_and_delete(&self, filter: GroupFilter) -> Result<Option<Group>> {
        Ok(self
            .delete(filter, DeleteScope::FindAndDelete)
            .await?
            .into_iter()
            .next())
    }

    async fn delete(&self, filter: GroupFilter, scope: DeleteScope) -> Result<Vec<Group>> {
        match self
            .dispatch(Mutation::DeleteByFilter { filter, scope })
            .await?
        {
            MutationOutcome::Deleted(groups) => Ok(groups),
            other => Err(unexpected("delete", &other)),
        }
    }

    pub async fn find(&self, query: FindQuery) -> Result<Vec<Group>> {
        match self.dispatch(Mutation::Find(query)).await? {
            MutationOutcome::Found(groups) => Ok(groups),
            other => Err(unexpected("find", &other)),
        }
    }

    pub async fn find_by_id(&self, id: &str, projection: Projection) -> Result<Option<Group>> {
        let query = FindQuery::new(GroupFilter::by_id(id))
            .projection(projection)
            .limit(1);
        Ok(self.find(query).await?.into_iter().next())
    }

    /// Find groups whose name contains every word of `text`, ignoring
    /// diacritics and case
    pub async fn search(&self, text: &str, filter: GroupFilter) -> Result<Vec<Group>> {
        let terms = self.dispatcher.maintainer().derive(text)?;
        if search_terms(&terms).is_empty() {
            return Ok(Vec::new());
        }
        self.find(FindQuery::new(filter.text(terms))).await
    }

    pub async fn count(&self, filter: &GroupFilter) -> Result<usize> {
        Ok(self.dispatcher.store().count(filter).await?)
    }

    /// Receive post-hook failures published from now on
    pub fn subscribe_failures(&self) -> broadcast::Receiver<PostHookFailure> {
        self.dispatcher.failures().subscribe()
    }

    /// Observer registry
    pub fn hooks(&self) -> &HookRegistry {
        self.dispatcher.observers()
    }

    pub async fn register_hook(&self, hook: Arc<dyn GroupHook>) {
        self.dispatcher.observers().register(hook).await;
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.dispatcher.store().health_check().await?)
    }

    pub fn store(&self) -> &Arc<dyn GroupStore> {
        self.dispatcher.store()
    }
}

fn unexpected(operation: &str, outcome: &MutationOutcome) -> ClubGroupError {
    ClubGroupError::Internal(format!(
        "unexpected outcome for {}: {:?}",
        operation, outcome
    ))
}

/// Builder for [`GroupRepository`]
pub struct GroupRepositoryBuilder {
    store: Option<Arc<dyn GroupStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    normalizer: Arc<dyn Normalizer>,
    cascade: Arc<dyn CascadePolicy>,
    expansion: Arc<dyn ReferenceExpansion>,
    observers: HookRegistry,
    failure_capacity: usize,
    post_hook_timeout: Duration,
}

impl Default for GroupRepositoryBuilder {
    fn default() -> Self {
        Self {
            store: None,
            notifier: None,
            normalizer: Arc::new(VietnameseFolding::new()),
            cascade: Arc::new(InertCascade),
            expansion: Arc::new(NoExpansion),
            observers: HookRegistry::new(),
            failure_capacity: 64,
            post_hook_timeout: Duration::from_millis(5000),
        }
    }
}

impl GroupRepositoryBuilder {
    pub fn store(mut self, store: Arc<dyn GroupStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn cascade(mut self, cascade: Arc<dyn CascadePolicy>) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn expansion(mut self, expansion: Arc<dyn ReferenceExpansion>) -> Self {
        self.expansion = expansion;
        self
    }

    /// Share an existing observer registry
    pub fn observers(mut self, observers: HookRegistry) -> Self {
        self.observers = observers;
        self
    }

    /// Buffer size of the failure channel
    pub fn failure_capacity(mut self, capacity: usize) -> Self {
        self.failure_capacity = capacity;
        self
    }

    /// Timeout applied to the creation notification and the cascade policy
    pub fn post_hook_timeout(mut self, timeout: Duration) -> Self {
        self.post_hook_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GroupRepository> {
        let store = self.store.ok_or_else(|| {
            ClubGroupError::Configuration("a group store is required".to_string())
        })?;
        let notifier = self.notifier.ok_or_else(|| {
            ClubGroupError::Configuration("a notifier is required".to_string())
        })?;

        let dispatcher = HookDispatcher::new(
            store,
            SearchTokenMaintainer::new(self.normalizer),
            CreationNotifier::new(notifier, self.post_hook_timeout),
            self.cascade,
            self.expansion,
            self.observers,
            FailureChannel::new(self.failure_capacity),
            self.post_hook_timeout,
        );

        Ok(GroupRepository {
            dispatcher: Arc::new(dispatcher),
        })
    }
}
