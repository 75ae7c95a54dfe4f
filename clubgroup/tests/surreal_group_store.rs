//! Repository and notification sink on the embedded SurrealDB engine

#![cfg(feature = "surrealdb-embedded")]

use std::sync::Arc;

use clubgroup::lifecycle::CREATION_MESSAGE;
use clubgroup::models::{Category, GroupPatch, NewGroup};
use clubgroup::notify::{MemoryNotifier, SurrealNotifier};
use clubgroup::repository::GroupRepository;
use clubgroup::storage::{
    BaseStore, EmbeddedGroupStore, GroupFilter, MemoryGroupStore, Projection, SurrealDBConfig,
    create_surreal_store,
};

async fn create_test_store() -> EmbeddedGroupStore {
    let config = SurrealDBConfig {
        namespace: "test".to_string(),
        database: "clubgroup_test".to_string(),
        ..SurrealDBConfig::default()
    };
    create_surreal_store(&config)
        .await
        .expect("Failed to create test store")
}

async fn create_test_repository() -> (GroupRepository, SurrealNotifier<surrealdb::engine::local::Db>) {
    let store = create_test_store().await;
    let notifier = SurrealNotifier::from_store(&store);
    let repo = GroupRepository::builder()
        .store(Arc::new(store))
        .notifier(Arc::new(notifier.clone()))
        .build()
        .expect("Failed to build repository");
    (repo, notifier)
}

#[tokio::test]
async fn test_store_health_and_metadata() {
    let store = create_test_store().await;

    assert!(store.health_check().await.expect("Health check failed"));

    let metadata = store.get_metadata().await.expect("Failed to get metadata");
    assert_eq!(metadata["type"], "surrealdb_group_store");
    assert_eq!(metadata["namespace"], "test");
    assert_eq!(metadata["database"], "clubgroup_test");
}

#[tokio::test]
async fn test_create_and_read_back() {
    let (repo, _) = create_test_repository().await;

    let group = repo
        .create(
            NewGroup::builder("Đội Văn Nghệ", "Music", "club-1")
                .member("u1")
                .category(Category::Arts)
                .build(),
        )
        .await
        .expect("Failed to create group");

    let full = repo
        .find_by_id(&group.id, Projection::full())
        .await
        .unwrap()
        .expect("Group should exist");
    assert_eq!(full.name, "Đội Văn Nghệ");
    assert_eq!(full.search_token.as_deref(), Some("doi van nghe"));
    assert_eq!(full.category, Category::Arts);
    assert_eq!(full.members.map(|m| m.len()), Some(1));

    let visible = repo
        .find_by_id(&group.id, Projection::default())
        .await
        .unwrap()
        .unwrap();
    assert!(visible.search_token.is_none());
    assert!(visible.members.is_none());
}

#[tokio::test]
async fn test_rename_rederives_token() {
    let (repo, _) = create_test_repository().await;
    let group = repo
        .create(NewGroup::builder("Chess", "d", "club-1").build())
        .await
        .unwrap();

    let result = repo
        .update_by_id(&group.id, GroupPatch::new().name("Cờ Tướng"))
        .await
        .unwrap();
    assert_eq!(result.matched, 1);

    let stored = repo
        .find_by_id(&group.id, Projection::full())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Cờ Tướng");
    assert_eq!(stored.search_token.as_deref(), Some("co tuong"));

    repo.update_by_id(&group.id, GroupPatch::new().description("Xiangqi"))
        .await
        .unwrap();
    let stored = repo
        .find_by_id(&group.id, Projection::full())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.search_token.as_deref(), Some("co tuong"));
}

#[tokio::test]
async fn test_full_text_search() {
    let (repo, _) = create_test_repository().await;
    for (name, club) in [
        ("Đội Văn Nghệ", "club-1"),
        ("Câu Lạc Bộ Văn Học", "club-2"),
        ("Bóng Đá", "club-1"),
    ] {
        repo.create(NewGroup::builder(name, "d", club).build())
            .await
            .unwrap();
    }

    assert_eq!(repo.search("văn", GroupFilter::new()).await.unwrap().len(), 2);
    assert_eq!(
        repo.search("VAN", GroupFilter::new().club("club-1"))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(repo.search("tennis", GroupFilter::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_splits_words_like_memory_store() {
    let (surreal, _) = create_test_repository().await;
    let memory = GroupRepository::builder()
        .store(Arc::new(MemoryGroupStore::new()))
        .notifier(Arc::new(MemoryNotifier::new()))
        .build()
        .unwrap();

    for repo in [&memory, &surreal] {
        for name in ["Chess-Club", "Robotics Club", "Đội K18"] {
            repo.create(NewGroup::builder(name, "d", "club-1").build())
                .await
                .unwrap();
        }
    }

    for (text, expected) in [("club", 2), ("chess", 1), ("robotics", 1), ("18", 1)] {
        let in_memory = memory.search(text, GroupFilter::new()).await.unwrap();
        let in_surreal = surreal.search(text, GroupFilter::new()).await.unwrap();
        assert_eq!(in_memory.len(), expected, "memory store, {text:?}");
        assert_eq!(in_surreal.len(), expected, "surreal store, {text:?}");
    }
}

#[tokio::test]
async fn test_update_and_delete_scopes() {
    let (repo, _) = create_test_repository().await;
    let first = repo
        .create(NewGroup::builder("A", "d", "club-1").build())
        .await
        .unwrap();
    repo.create(NewGroup::builder("B", "d", "club-1").build())
        .await
        .unwrap();

    let one = repo
        .update_one(GroupFilter::new().club("club-1"), GroupPatch::new().is_main(true))
        .await
        .unwrap();
    assert_eq!(one.ids, vec![first.id.clone()]);
    assert_eq!(
        repo.count(&GroupFilter::new().is_main(true)).await.unwrap(),
        1
    );

    let many = repo
        .update_many(GroupFilter::new().club("club-1"), GroupPatch::new().name("Same"))
        .await
        .unwrap();
    assert_eq!(many.matched, 2);
    assert_eq!(repo.search("same", GroupFilter::new()).await.unwrap().len(), 2);

    let deleted = repo
        .find_one_and_delete(GroupFilter::new().club("club-1"))
        .await
        .unwrap()
        .expect("A group should be deleted");
    assert_eq!(deleted.id, first.id);

    assert_eq!(repo.delete_many(GroupFilter::new()).await.unwrap(), 1);
    assert_eq!(repo.store().count(&GroupFilter::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_creation_notification_is_stored() {
    let (repo, notifier) = create_test_repository().await;

    let group = repo
        .create(NewGroup::builder("Chess", "d", "club-1").member("u1").build())
        .await
        .unwrap();
    repo.create(NewGroup::builder("Go", "d", "club-1").build())
        .await
        .unwrap();

    let stored = notifier.list_for_user("u1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content, CREATION_MESSAGE);
    assert_eq!(stored[0].link, group.id);
    assert!(!stored[0].id().is_empty());
}
