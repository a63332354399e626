//! Comment service.

use std::collections::HashMap;

use crate::services::{notification::NotificationService, policy};
use ideaboard_common::{AppError, AppResult, IdGenerator};
use ideaboard_db::{
    entities::{comment, idea, status, user},
    repositories::{CommentRepository, StatusRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for posting or editing a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(min = 4))]
    pub body: String,
}

/// A command issued against a single comment from its action menu.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum CommentCommand {
    /// Replace the body.
    Edit { body: String },
    /// Remove the comment.
    Delete,
    /// Flag the comment as spam.
    MarkAsSpam,
    /// Clear the spam flags.
    MarkAsNotSpam,
}

/// Event emitted after a command succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentEvent {
    CommentWasUpdated,
    CommentWasDeleted,
    CommentWasMarkedAsSpam,
    CommentWasMarkedAsNotSpam,
}

/// Result of a comment command.
#[derive(Debug, Clone, Serialize)]
pub struct CommentCommandOutcome {
    pub comment_id: String,
    pub event: CommentEvent,
}

/// A comment with everything needed to render it.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author: user::Model,
    /// Set for status-update comments.
    pub status: Option<status::Model>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    status_repo: StatusRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        user_repo: UserRepository,
        status_repo: StatusRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            user_repo,
            status_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comments on an idea in posting order, with authors and statuses.
    ///
    /// Comments whose author no longer exists are skipped.
    pub async fn list_for_idea(&self, idea_id: &str) -> AppResult<Vec<CommentView>> {
        let comments = self.comment_repo.find_by_idea(idea_id).await?;
        if comments.is_empty() {
            return Ok(vec![]);
        }

        let mut author_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let statuses: HashMap<i32, status::Model> = if comments.iter().any(|c| c.is_status_update) {
            self.status_repo
                .find_all()
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.user_id)?.clone();
                let status = comment.status_id.and_then(|id| statuses.get(&id).cloned());
                Some(CommentView {
                    comment,
                    author,
                    status,
                })
            })
            .collect())
    }

    /// Post a comment on an idea and notify the idea's owner.
    pub async fn create(
        &self,
        author: &user::Model,
        idea: &idea::Model,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let now = chrono::Utc::now();
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            idea_id: Set(idea.id.clone()),
            user_id: Set(author.id.clone()),
            body: Set(input.body),
            spam_reports: Set(0),
            is_status_update: Set(false),
            status_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(comment_id = %comment.id, idea_id = %idea.id, user_id = %author.id, "Created comment");

        // The comment is already saved; a failed notification must not undo it.
        if let Err(e) = self
            .notification_service
            .notify_comment_added(idea, &comment, author)
            .await
        {
            tracing::warn!(error = %e, comment_id = %comment.id, "Failed to notify idea owner");
        }

        Ok(comment)
    }

    /// Run a command from a comment's action menu.
    pub async fn execute(
        &self,
        actor: &user::Model,
        comment_id: &str,
        command: CommentCommand,
    ) -> AppResult<CommentCommandOutcome> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        let viewer = Some(actor);

        let event = match command {
            CommentCommand::Edit { body } => {
                if !policy::can_update_comment(viewer, &comment) {
                    return Err(AppError::Forbidden("Cannot edit this comment".to_string()));
                }
                let input = CommentInput { body };
                input.validate()?;
                self.comment_repo.update_body(comment, input.body).await?;
                CommentEvent::CommentWasUpdated
            }
            CommentCommand::Delete => {
                if !policy::can_delete_comment(viewer, &comment) {
                    return Err(AppError::Forbidden("Cannot delete this comment".to_string()));
                }
                self.comment_repo.delete(&comment.id).await?;
                CommentEvent::CommentWasDeleted
            }
            CommentCommand::MarkAsSpam => {
                if !policy::can_mark_as_spam(viewer, &comment) {
                    return Err(AppError::Forbidden(
                        "Cannot mark your own comment as spam".to_string(),
                    ));
                }
                self.comment_repo.increment_spam_reports(&comment.id).await?;
                CommentEvent::CommentWasMarkedAsSpam
            }
            CommentCommand::MarkAsNotSpam => {
                if !policy::can_mark_as_not_spam(viewer, &comment) {
                    return Err(AppError::Forbidden(
                        "Only admins can clear spam reports".to_string(),
                    ));
                }
                self.comment_repo.reset_spam_reports(&comment.id).await?;
                CommentEvent::CommentWasMarkedAsNotSpam
            }
        };

        tracing::info!(comment_id = %comment_id, user_id = %actor.id, event = ?event, "Comment command executed");

        Ok(CommentCommandOutcome {
            comment_id: comment_id.to_string(),
            event,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ideaboard_db::repositories::{
        IdeaRepository, NotificationRepository, VoteRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_service(comment_db: MockDatabase, user_db: MockDatabase, status_db: MockDatabase) -> CommentService {
        let notification_service = NotificationService::new(
            NotificationRepository::new(empty_db()),
            IdeaRepository::new(empty_db()),
            VoteRepository::new(empty_db()),
            CommentRepository::new(empty_db()),
            UserRepository::new(empty_db()),
            StatusRepository::new(empty_db()),
        );

        CommentService::new(
            CommentRepository::new(Arc::new(comment_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            StatusRepository::new(Arc::new(status_db.into_connection())),
            notification_service,
        )
    }

    fn create_test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            avatar_url: None,
            token: None,
            is_admin,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_comment(id: &str, author_id: &str, spam_reports: i32) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            idea_id: "idea1".to_string(),
            user_id: author_id.to_string(),
            body: "This is my first comment".to_string(),
            spam_reports,
            is_status_update: false,
            status_id: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[test]
    fn test_command_deserialize() {
        let edit: CommentCommand =
            serde_json::from_str(r#"{"command":"edit","body":"Updated text"}"#).unwrap();
        assert_eq!(
            edit,
            CommentCommand::Edit {
                body: "Updated text".to_string()
            }
        );

        let spam: CommentCommand = serde_json::from_str(r#"{"command":"markAsSpam"}"#).unwrap();
        assert_eq!(spam, CommentCommand::MarkAsSpam);

        let not_spam: CommentCommand =
            serde_json::from_str(r#"{"command":"markAsNotSpam"}"#).unwrap();
        assert_eq!(not_spam, CommentCommand::MarkAsNotSpam);
    }

    #[tokio::test]
    async fn test_non_author_cannot_edit() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author", 0)]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .execute(
                &create_test_user("joe", false),
                "c1",
                CommentCommand::Edit {
                    body: "Hijacked".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_author_cannot_flag_own_comment() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author", 0)]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .execute(&create_test_user("author", false), "c1", CommentCommand::MarkAsSpam)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_other_user_marks_as_spam() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author", 0)]])
                .append_exec_results([exec_ok()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let outcome = service
            .execute(&create_test_user("joe", false), "c1", CommentCommand::MarkAsSpam)
            .await
            .unwrap();

        assert_eq!(outcome.event, CommentEvent::CommentWasMarkedAsSpam);
    }

    #[tokio::test]
    async fn test_not_spam_requires_admin_and_reports() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author", 0)]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .execute(&create_test_user("admin", true), "c1", CommentCommand::MarkAsNotSpam)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author", 2)]])
                .append_exec_results([exec_ok()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let outcome = service
            .execute(&create_test_user("admin", true), "c1", CommentCommand::MarkAsNotSpam)
            .await
            .unwrap();
        assert_eq!(outcome.event, CommentEvent::CommentWasMarkedAsNotSpam);
    }

    #[tokio::test]
    async fn test_admin_deletes_any_comment() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author", 0)]])
                .append_exec_results([exec_ok()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let outcome = service
            .execute(&create_test_user("admin", true), "c1", CommentCommand::Delete)
            .await
            .unwrap();

        assert_eq!(outcome.event, CommentEvent::CommentWasDeleted);
        assert_eq!(outcome.comment_id, "c1");
    }

    #[tokio::test]
    async fn test_edit_rejects_short_body() {
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author", 0)]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .execute(
                &create_test_user("author", false),
                "c1",
                CommentCommand::Edit {
                    body: "no".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_for_idea_attaches_status() {
        let mut status_comment = create_test_comment("c2", "admin", 0);
        status_comment.is_status_update = true;
        status_comment.status_id = Some(3);

        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                create_test_comment("c1", "author", 0),
                status_comment,
            ]]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                create_test_user("admin", true),
                create_test_user("author", false),
            ]]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                status::Model {
                    id: 2,
                    name: "Considering".to_string(),
                },
                status::Model {
                    id: 3,
                    name: "In Progress".to_string(),
                },
            ]]),
        );

        let views = service.list_for_idea("idea1").await.unwrap();

        assert_eq!(views.len(), 2);
        assert!(views[0].status.is_none());
        assert_eq!(views[1].author.id, "admin");
        assert_eq!(views[1].status.as_ref().unwrap().name, "In Progress");
    }
}
