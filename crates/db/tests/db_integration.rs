//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored --test-threads=1`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `ideaboard_test`)
//!   `TEST_DB_PASSWORD` (default: `ideaboard_test`)
//!   `TEST_DB_NAME` (default: `ideaboard_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use ideaboard_common::AppError;
use ideaboard_db::{
    entities::{comment, idea, user, vote},
    repositories::{
        CategoryRepository, CommentRepository, IdeaRepository, StatusRepository, UserRepository,
        VoteRepository,
    },
    test_utils::TestDatabase,
};
use sea_orm::{DatabaseConnection, Set};

async fn setup() -> (TestDatabase, Arc<DatabaseConnection>) {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.expect("Cleanup failed");
    let conn = Arc::new(
        sea_orm::Database::connect(&db.config.database_url())
            .await
            .expect("Failed to connect"),
    );
    (db, conn)
}

async fn insert_user(conn: &Arc<DatabaseConnection>, id: &str, is_admin: bool) -> user::Model {
    UserRepository::new(conn.clone())
        .create(user::ActiveModel {
            id: Set(id.to_string()),
            name: Set(id.to_string()),
            email: Set(format!("{id}@example.com")),
            avatar_url: Set(None),
            token: Set(Some(format!("token-{id}"))),
            is_admin: Set(is_admin),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap()
}

async fn insert_idea(conn: &Arc<DatabaseConnection>, owner: &str, status_id: i32) -> idea::Model {
    IdeaRepository::new(conn.clone())
        .create(idea::ActiveModel {
            id: Set("idea1".to_string()),
            user_id: Set(owner.to_string()),
            category_id: Set(1),
            status_id: Set(status_id),
            title: Set("Dark mode".to_string()),
            slug: Set("dark-mode".to_string()),
            description: Set("Please add dark mode".to_string()),
            votes_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap()
}

fn status_comment(id: &str, author: &str, status_id: i32) -> comment::ActiveModel {
    comment::ActiveModel {
        id: Set(id.to_string()),
        idea_id: Set("idea1".to_string()),
        user_id: Set(author.to_string()),
        body: Set("Work has started.".to_string()),
        spam_reports: Set(0),
        is_status_update: Set(true),
        status_id: Set(Some(status_id)),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_seed_reference_data() {
    let (_db, conn) = setup().await;

    let statuses = StatusRepository::new(conn.clone()).find_all().await.unwrap();
    let names: Vec<&str> = statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        ["Open", "Considering", "In Progress", "Implemented", "Closed"]
    );

    let categories = CategoryRepository::new(conn).find_all().await.unwrap();
    assert_eq!(categories.len(), 4);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_status_change_commits_idea_and_comment_together() {
    let (_db, conn) = setup().await;
    insert_user(&conn, "owner", false).await;
    insert_user(&conn, "admin", true).await;
    insert_idea(&conn, "owner", 2).await;

    let update = IdeaRepository::new(conn.clone())
        .update_status_with_comment("idea1", 3, status_comment("c1", "admin", 3))
        .await
        .unwrap();
    assert_eq!(update.idea.status_id, 3);
    assert_eq!(update.previous_status_id, 2);
    assert!(update.idea.updated_at.is_some());

    let latest = CommentRepository::new(conn)
        .find_latest_status_update("idea1", 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, update.comment.id);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_identical_status_changes_commit_once() {
    let (_db, conn) = setup().await;
    insert_user(&conn, "owner", false).await;
    insert_user(&conn, "admin", true).await;
    insert_user(&conn, "admin2", true).await;
    insert_idea(&conn, "owner", 2).await;

    let repo = IdeaRepository::new(conn.clone());
    let (first, second) = tokio::join!(
        repo.update_status_with_comment("idea1", 3, status_comment("c1", "admin", 3)),
        repo.update_status_with_comment("idea1", 3, status_comment("c2", "admin2", 3)),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(
        |r| matches!(r, Err(AppError::Validation(msg)) if msg == "Status is the same")
    ));

    let comments = CommentRepository::new(conn).find_by_idea("idea1").await.unwrap();
    assert_eq!(comments.iter().filter(|c| c.is_status_update).count(), 1);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_status_change_on_deleted_idea_writes_nothing() {
    let (_db, conn) = setup().await;
    insert_user(&conn, "admin", true).await;

    let result = IdeaRepository::new(conn.clone())
        .update_status_with_comment("idea1", 3, status_comment("c1", "admin", 3))
        .await;
    assert!(matches!(result, Err(AppError::IdeaNotFound(_))));

    let comment = CommentRepository::new(conn).find_by_id("c1").await.unwrap();
    assert!(comment.is_none());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_voter_ids_and_cascade_delete() {
    let (_db, conn) = setup().await;
    insert_user(&conn, "owner", false).await;
    insert_user(&conn, "bob", false).await;
    insert_idea(&conn, "owner", 1).await;

    let votes = VoteRepository::new(conn.clone());
    for (id, user_id) in [("v1", "owner"), ("v2", "bob")] {
        votes
            .create(vote::ActiveModel {
                id: Set(id.to_string()),
                idea_id: Set("idea1".to_string()),
                user_id: Set(user_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }
    assert_eq!(votes.find_voter_ids("idea1").await.unwrap(), ["owner", "bob"]);

    IdeaRepository::new(conn.clone()).delete("idea1").await.unwrap();
    assert!(votes.find_voter_ids("idea1").await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_vote_keeps_count_consistent() {
    let (_db, conn) = setup().await;
    insert_user(&conn, "owner", false).await;
    insert_user(&conn, "bob", false).await;
    insert_idea(&conn, "owner", 1).await;

    let votes = VoteRepository::new(conn.clone());
    let ballot = |id: &str| vote::Model {
        id: id.to_string(),
        idea_id: "idea1".to_string(),
        user_id: "bob".to_string(),
        created_at: Utc::now().into(),
    };

    let (first, second) = tokio::join!(votes.add_vote(ballot("v1")), votes.add_vote(ballot("v2")));
    let added = [first.unwrap(), second.unwrap()];
    assert_eq!(added.iter().filter(|v| v.is_some()).count(), 1);

    let ideas = IdeaRepository::new(conn.clone());
    assert_eq!(votes_count(&ideas).await, 1);

    assert!(votes.remove_vote("idea1", "bob").await.unwrap());
    assert!(!votes.remove_vote("idea1", "bob").await.unwrap());
    assert_eq!(votes_count(&ideas).await, 0);
}

async fn votes_count(ideas: &IdeaRepository) -> i32 {
    ideas.find_by_id("idea1").await.unwrap().unwrap().votes_count
}
