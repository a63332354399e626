//! Vote service.

use ideaboard_common::{AppError, AppResult, IdGenerator};
use ideaboard_db::{
    entities::{idea, vote},
    repositories::VoteRepository,
};

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository) -> Self {
        Self {
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Whether `user_id` has voted for the idea.
    pub async fn has_voted(&self, idea_id: &str, user_id: &str) -> AppResult<bool> {
        self.vote_repo.is_voted(idea_id, user_id).await
    }

    /// Vote for an idea. The vote and the idea's count change together.
    pub async fn vote(&self, idea: &idea::Model, user_id: &str) -> AppResult<vote::Model> {
        let vote = self
            .vote_repo
            .add_vote(vote::Model {
                id: self.id_gen.generate(),
                idea_id: idea.id.clone(),
                user_id: user_id.to_string(),
                created_at: chrono::Utc::now().into(),
            })
            .await?
            .ok_or_else(|| AppError::Conflict("Already voted for this idea".to_string()))?;

        tracing::debug!(idea_id = %idea.id, user_id = %user_id, "Voted");
        Ok(vote)
    }

    /// Remove a vote.
    pub async fn unvote(&self, idea: &idea::Model, user_id: &str) -> AppResult<()> {
        if !self.vote_repo.remove_vote(&idea.id, user_id).await? {
            return Err(AppError::NotFound("vote".to_string()));
        }

        tracing::debug!(idea_id = %idea.id, user_id = %user_id, "Removed vote");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_idea() -> idea::Model {
        idea::Model {
            id: "idea1".to_string(),
            user_id: "owner".to_string(),
            category_id: 1,
            status_id: 1,
            title: "My First Idea".to_string(),
            slug: "my-first-idea".to_string(),
            description: "Description for my first idea".to_string(),
            votes_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn exec_result(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn create_service(vote_db: MockDatabase) -> VoteService {
        VoteService::new(VoteRepository::new(Arc::new(vote_db.into_connection())))
    }

    #[tokio::test]
    async fn test_vote_twice_conflicts() {
        // The insert hit the unique (idea, user) pair.
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([exec_result(0)]),
        );

        let result = service.vote(&create_test_idea(), "user1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_vote() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_result(1), exec_result(1)]),
        );

        let vote = service.vote(&create_test_idea(), "user2").await.unwrap();

        assert_eq!(vote.user_id, "user2");
        assert_eq!(vote.idea_id, "idea1");
    }

    #[tokio::test]
    async fn test_vote_count_failure_is_reported() {
        // Insert succeeds, the count update finds no queued result and errors;
        // the transaction is dropped without commit.
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([exec_result(1)]),
        );

        let result = service.vote(&create_test_idea(), "user2").await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_unvote() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_result(1), exec_result(1)]),
        );

        service.unvote(&create_test_idea(), "user2").await.unwrap();
    }

    #[tokio::test]
    async fn test_unvote_without_vote() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([exec_result(0)]),
        );

        let result = service.unvote(&create_test_idea(), "user2").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
