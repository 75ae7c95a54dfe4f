//! Example: Group Lifecycle
//!
//! Walks a group through create, rename, search and delete on the in-memory
//! store, printing the failures reported by post-hooks along the way.

use clubgroup::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigBuilder::testing().with_log_level(LogLevel::Info).build()?;
    let groups = init(config).await?;
    let mut failures = groups.subscribe_failures();

    println!("┌─ Create ───────────────────────────────────────────────────────┐");
    let group = groups
        .create(
            NewGroup::builder("Đội Văn Nghệ", "Music and dance", "club-1")
                .member_with_role("user-1", MemberRole::Manager)
                .category(Category::Arts)
                .build(),
        )
        .await?;
    println!("Created {} ({})", group.name, group.id);
    println!("Search token: {:?}", group.search_token);

    // No members, so nobody can be told about it
    let quiet = groups
        .create(NewGroup::builder("Cờ Vua", "Chess", "club-1").build())
        .await?;
    if let Ok(failure) = failures.try_recv() {
        println!("Post-hook failure for {}: {}", quiet.id, failure);
    }
    println!("└────────────────────────────────────────────────────────────────┘\n");

    println!("┌─ Rename ───────────────────────────────────────────────────────┐");
    groups
        .update_by_id(&group.id, GroupPatch::new().name("Ban Nhạc Acoustic"))
        .await?;
    let renamed = groups.find_by_id(&group.id, Projection::full()).await?;
    if let Some(renamed) = renamed {
        println!("{} -> token {:?}", renamed.name, renamed.search_token);
    }
    println!("└────────────────────────────────────────────────────────────────┘\n");

    println!("┌─ Search ───────────────────────────────────────────────────────┐");
    for query in ["nhac", "CO VUA", "văn nghệ"] {
        let found = groups.search(query, GroupFilter::new()).await?;
        let names: Vec<_> = found.iter().map(|g| g.name.as_str()).collect();
        println!("{:>10}: {:?}", query, names);
    }
    println!("└────────────────────────────────────────────────────────────────┘\n");

    println!("┌─ Delete ───────────────────────────────────────────────────────┐");
    let removed = groups.delete_many(GroupFilter::new().club("club-1")).await?;
    println!("Removed {} group(s)", removed);
    println!("└────────────────────────────────────────────────────────────────┘");

    Ok(())
}
