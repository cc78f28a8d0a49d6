//! Integration tests for `DieselPromptRepository` against embedded
//! PostgreSQL.

use chrono::{Duration, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

use promptdeck::domain::ports::{PromptRepository, PromptRepositoryError};
use promptdeck::domain::{
    Level, Prompt, PromptDraft, PromptId, PromptOwner, PromptText, SEED_PROMPTS, SeedOutcome,
    UserId, seed_admin_prompts,
};
use promptdeck::outbound::persistence::DieselPromptRepository;

mod support;

use support::{database_pool, handle_cluster_setup_failure};

struct TestContext {
    runtime: Runtime,
    repository: DieselPromptRepository,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let (pool, database) = database_pool(&runtime, 2)?;
    Ok(TestContext {
        runtime,
        repository: DieselPromptRepository::new(pool),
        _database: database,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn prompt(owner: PromptOwner, text: &str, age_minutes: i64) -> Prompt {
    Prompt::new(PromptDraft {
        id: PromptId::random(),
        text: PromptText::new(text).expect("valid text"),
        level: Level::new("Ice").expect("valid level"),
        owner,
        public: true,
        created_at: Utc::now() - Duration::minutes(age_minutes),
    })
}

fn user(raw: &str) -> PromptOwner {
    PromptOwner::User(UserId::new(raw).expect("valid user id"))
}

#[rstest]
fn insert_rejects_a_reused_id(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: insert_rejects_a_reused_id skipped");
        return;
    };
    let repository = context.repository.clone();
    let original = prompt(user("sub-a"), "Coffee or tea?", 0);

    let (second, stored) = context.runtime.block_on(async {
        repository.insert(&original).await.expect("first insert");
        let second = repository.insert(&original).await;
        let stored = repository
            .find_by_id(&original.id())
            .await
            .expect("find prompt");
        (second, stored)
    });

    assert!(matches!(
        second,
        Err(PromptRepositoryError::Duplicate { .. })
    ));
    let stored = stored.expect("prompt exists");
    assert_eq!(stored.text().as_ref(), "Coffee or tea?");
    assert_eq!(*stored.owner(), user("sub-a"));
}

#[rstest]
fn list_by_owner_is_scoped_and_oldest_first(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: list_by_owner_is_scoped_and_oldest_first skipped");
        return;
    };
    let repository = context.repository.clone();
    let newer = prompt(user("sub-a"), "Newer", 1);
    let older = prompt(user("sub-a"), "Older", 30);
    let foreign = prompt(user("sub-b"), "Someone else's", 10);
    let admin = prompt(PromptOwner::Admin, "Shared", 5);

    let (own, admins) = context.runtime.block_on(async {
        for item in [&newer, &older, &foreign, &admin] {
            repository.insert(item).await.expect("insert prompt");
        }
        let own = repository
            .list_by_owner(&user("sub-a"))
            .await
            .expect("list own");
        let admins = repository
            .list_by_owner(&PromptOwner::Admin)
            .await
            .expect("list admin");
        (own, admins)
    });

    let own_ids: Vec<PromptId> = own.iter().map(Prompt::id).collect();
    assert_eq!(own_ids, vec![older.id(), newer.id()]);
    let admin_ids: Vec<PromptId> = admins.iter().map(Prompt::id).collect();
    assert_eq!(admin_ids, vec![admin.id()]);
}

#[rstest]
fn delete_reports_whether_a_row_was_removed(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: delete_reports_whether_a_row_was_removed skipped");
        return;
    };
    let repository = context.repository.clone();
    let target = prompt(user("sub-a"), "Gone soon", 0);

    let (first, second, found) = context.runtime.block_on(async {
        repository.insert(&target).await.expect("insert prompt");
        let first = repository.delete(&target.id()).await.expect("delete");
        let second = repository.delete(&target.id()).await.expect("second delete");
        let found = repository.find_by_id(&target.id()).await.expect("lookup");
        (first, second, found)
    });

    assert!(first);
    assert!(!second);
    assert!(found.is_none());
}

#[rstest]
fn seeding_is_skipped_once_admin_prompts_exist(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: seeding_is_skipped_once_admin_prompts_exist skipped");
        return;
    };
    let repository = context.repository.clone();

    let (first, second) = context.runtime.block_on(async {
        let first = seed_admin_prompts(&repository, &mockable::DefaultClock)
            .await
            .expect("first seed");
        let second = seed_admin_prompts(&repository, &mockable::DefaultClock)
            .await
            .expect("second seed");
        (first, second)
    });

    assert_eq!(
        first,
        SeedOutcome::Seeded {
            count: SEED_PROMPTS.len()
        }
    );
    assert_eq!(
        second,
        SeedOutcome::AlreadySeeded {
            existing: SEED_PROMPTS.len()
        }
    );
}
