//! Hook side effects: creation notifications, cascade policy, reference
//! expansion on reads, observers and the failure channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;

use clubgroup::hooks::{GroupHook, HookResult};
use clubgroup::ClubGroupError;
use clubgroup::lifecycle::{
    CREATION_MESSAGE, CascadeError, CascadePolicy, FindQuery, Mutation, MutationOutcome,
    PostHookFailure, ReferenceExpansion,
};
use clubgroup::models::{GroupPatch, NewGroup};
use clubgroup::notify::{MemoryNotifier, Notification, Notifier, NotifyError};
use clubgroup::repository::GroupRepository;
use clubgroup::storage::{GroupFilter, MemoryGroupStore, Projection, UpdateResult};

mock! {
    pub Sink {}

    #[async_trait]
    impl Notifier for Sink {
        async fn create(&self, notification: Notification) -> Result<(), NotifyError>;
    }
}

/// Records every group ID it is asked to clean up after
#[derive(Debug, Default)]
struct RecordingCascade {
    seen: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingCascade {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CascadePolicy for RecordingCascade {
    async fn on_deleted(&self, group_id: &str) -> Result<(), CascadeError> {
        self.seen.lock().unwrap().push(group_id.to_string());
        if self.fail {
            return Err(CascadeError("dependents locked".to_string()));
        }
        Ok(())
    }
}

/// Widens every read to the full projection and a single result
#[derive(Debug, Default)]
struct RecordingExpansion {
    seen: Mutex<Vec<FindQuery>>,
    fail: bool,
}

impl RecordingExpansion {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn seen(&self) -> Vec<FindQuery> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReferenceExpansion for RecordingExpansion {
    async fn before_find(&self, query: &mut FindQuery) -> clubgroup::Result<()> {
        self.seen.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(ClubGroupError::Validation("members not resolvable".to_string()));
        }
        query.projection = Projection::full();
        query.limit = Some(1);
        Ok(())
    }
}

#[derive(Debug)]
struct FailingObserver;

#[async_trait]
impl GroupHook for FailingObserver {
    async fn on_group_updated(&self, _result: &UpdateResult, _patch: &GroupPatch) -> HookResult {
        HookResult::Failed("audit log full".to_string())
    }

    fn name(&self) -> &str {
        "audit"
    }
}

fn repo_with(notifier: Arc<dyn Notifier>) -> GroupRepository {
    GroupRepository::builder()
        .store(Arc::new(MemoryGroupStore::new()))
        .notifier(notifier)
        .build()
        .expect("Failed to build repository")
}

#[tokio::test]
async fn test_create_notifies_first_member_once() {
    let mut sink = MockSink::new();
    sink.expect_create()
        .withf(|n| n.recipient == "u1" && n.content == CREATION_MESSAGE)
        .times(1)
        .returning(|_| Ok(()));
    let repo = repo_with(Arc::new(sink));

    let group = repo
        .create(
            NewGroup::builder("Chess", "d", "club-1")
                .member("u1")
                .member("u2")
                .build(),
        )
        .await
        .unwrap();

    assert!(!group.id.is_empty());
}

#[tokio::test]
async fn test_notification_links_new_group() {
    let notifier = Arc::new(MemoryNotifier::new());
    let repo = repo_with(notifier.clone());

    let group = repo
        .create(NewGroup::builder("Chess", "d", "club-1").member("u1").build())
        .await
        .unwrap();

    let sent = notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], Notification::new(CREATION_MESSAGE, group.id, "u1"));
}

#[tokio::test]
async fn test_create_without_members_skips_notification() {
    let mut sink = MockSink::new();
    sink.expect_create().never();
    let repo = repo_with(Arc::new(sink));
    let mut failures = repo.subscribe_failures();

    let group = repo
        .create(NewGroup::builder("Chess", "d", "club-1").build())
        .await
        .expect("Create must succeed without members");

    assert_eq!(
        failures.recv().await.unwrap(),
        PostHookFailure::MissingRecipient { group_id: group.id }
    );
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_create() {
    let mut sink = MockSink::new();
    sink.expect_create()
        .times(1)
        .returning(|_| Err(NotifyError::Delivery("connection refused".to_string())));
    let repo = repo_with(Arc::new(sink));
    let mut failures = repo.subscribe_failures();

    let group = repo
        .create(NewGroup::builder("Chess", "d", "club-1").member("u1").build())
        .await
        .unwrap();

    match failures.recv().await.unwrap() {
        PostHookFailure::NotificationFailed { group_id, reason } => {
            assert_eq!(group_id, group.id);
            assert!(reason.contains("connection refused"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }
    assert_eq!(repo.count(&GroupFilter::new()).await.unwrap(), 1);
}

#[derive(Debug)]
struct StalledNotifier;

#[async_trait]
impl Notifier for StalledNotifier {
    async fn create(&self, _notification: Notification) -> Result<(), NotifyError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_stalled_notifier_times_out() {
    let repo = GroupRepository::builder()
        .store(Arc::new(MemoryGroupStore::new()))
        .notifier(Arc::new(StalledNotifier))
        .post_hook_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let mut failures = repo.subscribe_failures();

    repo.create(NewGroup::builder("Chess", "d", "club-1").member("u1").build())
        .await
        .unwrap();

    assert!(matches!(
        failures.recv().await.unwrap(),
        PostHookFailure::NotificationFailed { .. }
    ));
}

#[tokio::test]
async fn test_cascade_runs_once_per_deleted_group() {
    let cascade = Arc::new(RecordingCascade::default());
    let repo = GroupRepository::builder()
        .store(Arc::new(MemoryGroupStore::new()))
        .notifier(Arc::new(MemoryNotifier::new()))
        .cascade(cascade.clone())
        .build()
        .unwrap();

    let a = repo
        .create(NewGroup::builder("A", "d", "club-1").build())
        .await
        .unwrap();
    let b = repo
        .create(NewGroup::builder("B", "d", "club-1").build())
        .await
        .unwrap();

    assert!(repo.delete_by_id(&a.id).await.unwrap());
    assert_eq!(cascade.seen(), vec![a.id.clone()]);

    // Deleting nothing runs no cascade
    assert!(!repo.delete_by_id(&a.id).await.unwrap());
    assert_eq!(cascade.seen(), vec![a.id.clone()]);

    assert_eq!(repo.delete_many(GroupFilter::new()).await.unwrap(), 1);
    assert_eq!(cascade.seen(), vec![a.id, b.id]);
}

#[tokio::test]
async fn test_cascade_failure_is_reported_not_raised() {
    let repo = GroupRepository::builder()
        .store(Arc::new(MemoryGroupStore::new()))
        .notifier(Arc::new(MemoryNotifier::new()))
        .cascade(Arc::new(RecordingCascade::failing()))
        .build()
        .unwrap();
    let group = repo
        .create(NewGroup::builder("A", "d", "club-1").member("u1").build())
        .await
        .unwrap();
    let mut failures = repo.subscribe_failures();

    assert!(repo.delete_by_id(&group.id).await.unwrap());

    match failures.recv().await.unwrap() {
        PostHookFailure::CascadeFailed { group_id, reason } => {
            assert_eq!(group_id, group.id);
            assert!(reason.contains("dependents locked"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn test_expansion_rewrites_query_before_read() {
    let expansion = Arc::new(RecordingExpansion::default());
    let repo = GroupRepository::builder()
        .store(Arc::new(MemoryGroupStore::new()))
        .notifier(Arc::new(MemoryNotifier::new()))
        .expansion(expansion.clone())
        .build()
        .unwrap();
    for name in ["Chess", "Go"] {
        repo.create(NewGroup::builder(name, "d", "club-1").member("u1").build())
            .await
            .unwrap();
    }
    repo.update_many(GroupFilter::new(), GroupPatch::new().is_main(true))
        .await
        .unwrap();
    repo.delete_one(GroupFilter::new().name("Go")).await.unwrap();
    repo.create(NewGroup::builder("Go", "d", "club-1").build())
        .await
        .unwrap();
    assert!(expansion.seen().is_empty(), "writes do not expand");

    let query = FindQuery::new(GroupFilter::new().club("club-1"));
    let groups = match repo.dispatch(Mutation::Find(query.clone())).await.unwrap() {
        MutationOutcome::Found(groups) => groups,
        other => panic!("unexpected outcome: {other:?}"),
    };

    // The store saw the widened projection and the tightened limit
    assert_eq!(groups.len(), 1);
    assert!(groups[0].search_token.is_some());
    assert_eq!(expansion.seen(), vec![query]);
}

#[tokio::test]
async fn test_expansion_error_aborts_read() {
    let repo = GroupRepository::builder()
        .store(Arc::new(MemoryGroupStore::new()))
        .notifier(Arc::new(MemoryNotifier::new()))
        .expansion(Arc::new(RecordingExpansion::failing()))
        .build()
        .unwrap();
    repo.create(NewGroup::builder("Chess", "d", "club-1").build())
        .await
        .unwrap();

    let err = repo
        .find(FindQuery::new(GroupFilter::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClubGroupError::Validation(ref reason) if reason.contains("resolvable")));
    assert!(matches!(
        repo.search("chess", GroupFilter::new()).await,
        Err(ClubGroupError::Validation(_))
    ));

    // Direct store access bypasses the hook
    assert_eq!(repo.count(&GroupFilter::new()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_observer_failure_is_published() {
    let repo = repo_with(Arc::new(MemoryNotifier::new()));
    repo.register_hook(Arc::new(FailingObserver)).await;
    assert_eq!(repo.hooks().hook_count().await, 1);

    let group = repo
        .create(NewGroup::builder("Chess", "d", "club-1").member("u1").build())
        .await
        .unwrap();
    let mut failures = repo.subscribe_failures();

    let result = repo
        .update_by_id(&group.id, GroupPatch::new().name("Go"))
        .await
        .expect("Observer failures never fail the update");
    assert_eq!(result.matched, 1);

    assert_eq!(
        failures.recv().await.unwrap(),
        PostHookFailure::ObserverFailed {
            hook: "audit".to_string(),
            event: "group.updated",
            reason: "audit log full".to_string(),
        }
    );
}
