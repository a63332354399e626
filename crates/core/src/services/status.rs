//! Idea status workflow.
//!
//! An admin picks a new status for an idea on the set-status form. Submitting
//! it stores the status and an announcing comment in one transaction, then
//! optionally queues a job that notifies every voter.

use crate::services::{
    dispatch::{DispatchService, VoterNotification},
    policy,
};
use ideaboard_common::{AppError, AppResult, IdGenerator};
use ideaboard_db::{
    entities::{comment, idea, status, user},
    repositories::{IdeaRepository, StatusRepository, StatusUpdate},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Body used when the admin leaves the comment empty.
pub const DEFAULT_STATUS_COMMENT: &str = "No comment was added.";

/// A set-status submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusRequest {
    pub status_id: i32,
    #[serde(default)]
    pub notify_all_voters: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Lifecycle of the set-status form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormPhase {
    /// Showing the idea's current status.
    Idle,
    /// The admin picked a status.
    StatusSelected,
    /// A submission is being processed.
    Submitting,
    /// The last submission was saved.
    Persisted,
}

/// State of the set-status form for one idea.
#[derive(Debug, Clone)]
pub struct SetStatusForm {
    idea_id: String,
    current_status_id: i32,
    selected_status_id: i32,
    notify_all_voters: bool,
    comment: Option<String>,
    phase: FormPhase,
}

impl SetStatusForm {
    /// A fresh form with the idea's current status pre-selected.
    #[must_use]
    pub fn for_idea(idea: &idea::Model) -> Self {
        Self {
            idea_id: idea.id.clone(),
            current_status_id: idea.status_id,
            selected_status_id: idea.status_id,
            notify_all_voters: false,
            comment: None,
            phase: FormPhase::Idle,
        }
    }

    /// Pick a status.
    pub fn select(&mut self, status_id: i32) {
        self.selected_status_id = status_id;
        self.phase = FormPhase::StatusSelected;
    }

    /// Toggle the "notify all voters" checkbox.
    pub fn set_notify_all_voters(&mut self, notify: bool) {
        self.notify_all_voters = notify;
    }

    /// Set the announcement text.
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Fill the form from a submitted request.
    pub fn apply(&mut self, request: SetStatusRequest) {
        self.select(request.status_id);
        self.set_notify_all_voters(request.notify_all_voters);
        self.set_comment(request.comment);
    }

    #[must_use]
    pub fn idea_id(&self) -> &str {
        &self.idea_id
    }

    #[must_use]
    pub const fn current_status_id(&self) -> i32 {
        self.current_status_id
    }

    #[must_use]
    pub const fn selected_status_id(&self) -> i32 {
        self.selected_status_id
    }

    #[must_use]
    pub const fn notify_all_voters(&self) -> bool {
        self.notify_all_voters
    }

    #[must_use]
    pub const fn phase(&self) -> FormPhase {
        self.phase
    }
}

/// Event emitted once a status change is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename = "statusWasUpdated")]
pub struct StatusWasUpdated {
    pub idea_id: String,
    pub status_id: i32,
    pub comment_id: String,
}

/// Result of a saved status change.
#[derive(Debug, Clone)]
pub struct StatusChangeOutcome {
    pub idea: idea::Model,
    pub comment: comment::Model,
    pub status: status::Model,
    /// Whether a voter notification job was stored. Always false when the
    /// admin did not ask for one.
    pub voters_notification_queued: bool,
    pub event: StatusWasUpdated,
}

/// Status service for business logic.
#[derive(Clone)]
pub struct StatusService {
    idea_repo: IdeaRepository,
    status_repo: StatusRepository,
    dispatch: DispatchService,
    id_gen: IdGenerator,
}

impl StatusService {
    /// Create a new status service.
    #[must_use]
    pub const fn new(
        idea_repo: IdeaRepository,
        status_repo: StatusRepository,
        dispatch: DispatchService,
    ) -> Self {
        Self {
            idea_repo,
            status_repo,
            dispatch,
            id_gen: IdGenerator::new(),
        }
    }

    /// All statuses, in workflow order.
    pub async fn list(&self) -> AppResult<Vec<status::Model>> {
        self.status_repo.find_all().await
    }

    /// Find a status by ID.
    pub async fn find(&self, id: i32) -> AppResult<Option<status::Model>> {
        self.status_repo.find_by_id(id).await
    }

    /// Submit the form, driving it through `Submitting` to `Persisted`.
    ///
    /// On error the form returns to the phase it was in so it can be
    /// resubmitted.
    pub async fn submit(
        &self,
        actor: &user::Model,
        form: &mut SetStatusForm,
    ) -> AppResult<StatusChangeOutcome> {
        let previous = form.phase;
        form.phase = FormPhase::Submitting;

        match self
            .set_status(
                actor,
                &form.idea_id,
                form.selected_status_id,
                form.notify_all_voters,
                form.comment.clone(),
            )
            .await
        {
            Ok(outcome) => {
                form.current_status_id = outcome.idea.status_id;
                form.phase = FormPhase::Persisted;
                Ok(outcome)
            }
            Err(e) => {
                form.phase = previous;
                Err(e)
            }
        }
    }

    /// Change an idea's status.
    ///
    /// Rejects non-admins, unknown statuses and the status the idea already
    /// has. The last check runs against the locked idea row, so two identical
    /// submissions racing each other commit and queue only once. The idea and
    /// the announcing comment are written in one transaction; the voter job is
    /// queued only after commit.
    pub async fn set_status(
        &self,
        actor: &user::Model,
        idea_id: &str,
        status_id: i32,
        notify_all_voters: bool,
        comment: Option<String>,
    ) -> AppResult<StatusChangeOutcome> {
        if !policy::can_set_status(Some(actor)) {
            return Err(AppError::Forbidden(
                "Only admins can change an idea's status".to_string(),
            ));
        }

        let status = self
            .status_repo
            .find_by_id(status_id)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Unknown status: {status_id}")))?;

        let body = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS_COMMENT.to_string());

        let now = chrono::Utc::now();
        let announcement = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            idea_id: Set(idea_id.to_string()),
            user_id: Set(actor.id.clone()),
            body: Set(body),
            spam_reports: Set(0),
            is_status_update: Set(true),
            status_id: Set(Some(status_id)),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let StatusUpdate {
            idea,
            comment,
            previous_status_id,
        } = self
            .idea_repo
            .update_status_with_comment(idea_id, status_id, announcement)
            .await?;

        tracing::info!(
            idea_id = %idea.id,
            from_status = previous_status_id,
            to_status = status_id,
            admin_id = %actor.id,
            "Idea status changed"
        );

        let voters_notification_queued = if notify_all_voters {
            let request = VoterNotification {
                idea_id: idea.id.clone(),
                status_id,
                actor_id: actor.id.clone(),
            };
            match self.dispatch.notify_all_voters(request).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        idea_id = %idea.id,
                        status_id,
                        "Failed to queue voter notifications; status change kept"
                    );
                    false
                }
            }
        } else {
            false
        };

        let event = StatusWasUpdated {
            idea_id: idea.id.clone(),
            status_id,
            comment_id: comment.id.clone(),
        };

        Ok(StatusChangeOutcome {
            idea,
            comment,
            status,
            voters_notification_queued,
            event,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::dispatch::RecordingDispatch;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

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

    fn create_test_idea(status_id: i32) -> idea::Model {
        idea::Model {
            id: "idea1".to_string(),
            user_id: "ann".to_string(),
            category_id: 1,
            status_id,
            title: "My First Idea".to_string(),
            slug: "my-first-idea".to_string(),
            description: "Description for my first idea".to_string(),
            votes_count: 4,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn in_progress() -> status::Model {
        status::Model {
            id: 3,
            name: "In Progress".to_string(),
        }
    }

    fn status_comment(body: &str) -> comment::Model {
        comment::Model {
            id: "c1".to_string(),
            idea_id: "idea1".to_string(),
            user_id: "admin".to_string(),
            body: body.to_string(),
            spam_reports: 0,
            is_status_update: true,
            status_id: Some(3),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    /// Idea mock for a successful change from Considering to In Progress:
    /// locked read, update, comment insert.
    fn successful_idea_db() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_idea(2)]])
            .append_query_results([[create_test_idea(3)]])
            .append_query_results([[status_comment(DEFAULT_STATUS_COMMENT)]])
    }

    fn create_service(
        idea_db: MockDatabase,
        status_db: MockDatabase,
        dispatch: &RecordingDispatch,
    ) -> StatusService {
        StatusService::new(
            IdeaRepository::new(Arc::new(idea_db.into_connection())),
            StatusRepository::new(Arc::new(status_db.into_connection())),
            Arc::new(dispatch.clone()),
        )
    }

    #[test]
    fn test_form_starts_idle_with_current_status() {
        let form = SetStatusForm::for_idea(&create_test_idea(2));

        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(form.selected_status_id(), 2);
        assert_eq!(form.current_status_id(), 2);
        assert!(!form.notify_all_voters());
    }

    #[test]
    fn test_form_select() {
        let mut form = SetStatusForm::for_idea(&create_test_idea(2));
        form.select(3);

        assert_eq!(form.phase(), FormPhase::StatusSelected);
        assert_eq!(form.selected_status_id(), 3);
        assert_eq!(form.current_status_id(), 2);
    }

    #[test]
    fn test_event_serializes_with_name() {
        let event = StatusWasUpdated {
            idea_id: "idea1".to_string(),
            status_id: 3,
            comment_id: "c1".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "statusWasUpdated");
        assert_eq!(json["status_id"], 3);
    }

    #[tokio::test]
    async fn test_set_status_with_notify_queues_one_job() {
        let dispatch = RecordingDispatch::new();
        let service = create_service(
            successful_idea_db(),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[in_progress()]]),
            &dispatch,
        );

        let admin = create_test_user("admin", true);
        let mut form = SetStatusForm::for_idea(&create_test_idea(2));
        form.select(3);
        form.set_notify_all_voters(true);

        let outcome = service.submit(&admin, &mut form).await.unwrap();

        assert_eq!(outcome.idea.status_id, 3);
        assert!(outcome.comment.is_status_update);
        assert_eq!(outcome.comment.status_id, Some(3));
        assert!(outcome.voters_notification_queued);
        assert_eq!(outcome.event.comment_id, "c1");
        assert_eq!(form.phase(), FormPhase::Persisted);
        assert_eq!(form.current_status_id(), 3);

        let sent = dispatch.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            VoterNotification {
                idea_id: "idea1".to_string(),
                status_id: 3,
                actor_id: "admin".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_set_status_without_notify_queues_nothing() {
        let dispatch = RecordingDispatch::new();
        let service = create_service(
            successful_idea_db(),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[in_progress()]]),
            &dispatch,
        );

        let outcome = service
            .set_status(&create_test_user("admin", true), "idea1", 3, false, None)
            .await
            .unwrap();

        assert!(!outcome.voters_notification_queued);
        assert!(dispatch.sent().is_empty());
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let dispatch = RecordingDispatch::new();
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            &dispatch,
        );

        let mut form = SetStatusForm::for_idea(&create_test_idea(2));
        form.select(3);
        form.set_notify_all_voters(true);

        let result = service
            .submit(&create_test_user("joe", false), &mut form)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(form.phase(), FormPhase::StatusSelected);
        assert!(dispatch.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let dispatch = RecordingDispatch::new();
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<status::Model>::new()]),
            &dispatch,
        );

        let result = service
            .set_status(&create_test_user("admin", true), "idea1", 42, true, None)
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("42")));
    }

    #[tokio::test]
    async fn test_same_status_is_rejected() {
        let dispatch = RecordingDispatch::new();
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_idea(3)]]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[in_progress()]]),
            &dispatch,
        );

        let result = service
            .set_status(&create_test_user("admin", true), "idea1", 3, true, None)
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Status is the same"));
        assert!(dispatch.sent().is_empty());
    }

    #[tokio::test]
    async fn test_stale_form_is_rejected_once_status_already_changed() {
        // The form was built while the idea was Considering; another admin
        // moved it to In Progress before this submission took the row lock.
        let dispatch = RecordingDispatch::new();
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_idea(3)]]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[in_progress()]]),
            &dispatch,
        );

        let mut form = SetStatusForm::for_idea(&create_test_idea(2));
        form.select(3);
        form.set_notify_all_voters(true);

        let result = service
            .submit(&create_test_user("admin", true), &mut form)
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Status is the same"));
        assert!(dispatch.sent().is_empty());
        assert_eq!(form.phase(), FormPhase::StatusSelected);
    }

    #[tokio::test]
    async fn test_persisted_form_accepts_a_further_change() {
        let dispatch = RecordingDispatch::new();
        let service = create_service(
            successful_idea_db()
                .append_query_results([[create_test_idea(3)]])
                .append_query_results([[create_test_idea(4)]])
                .append_query_results([[{
                    let mut c = status_comment(DEFAULT_STATUS_COMMENT);
                    c.id = "c2".to_string();
                    c.status_id = Some(4);
                    c
                }]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[in_progress()]])
                .append_query_results([[status::Model {
                    id: 4,
                    name: "Implemented".to_string(),
                }]]),
            &dispatch,
        );

        let admin = create_test_user("admin", true);
        let mut form = SetStatusForm::for_idea(&create_test_idea(2));
        form.select(3);
        service.submit(&admin, &mut form).await.unwrap();
        assert_eq!(form.phase(), FormPhase::Persisted);

        form.select(4);
        let outcome = service.submit(&admin, &mut form).await.unwrap();

        assert_eq!(outcome.event.comment_id, "c2");
        assert_eq!(form.current_status_id(), 4);
        assert_eq!(form.phase(), FormPhase::Persisted);
    }

    #[tokio::test]
    async fn test_deleted_idea_leaves_form_resubmittable() {
        let dispatch = RecordingDispatch::new();
        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<idea::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[in_progress()]]),
            &dispatch,
        );

        let mut form = SetStatusForm::for_idea(&create_test_idea(2));
        form.select(3);

        let result = service
            .submit(&create_test_user("admin", true), &mut form)
            .await;

        assert!(matches!(result, Err(AppError::IdeaNotFound(_))));
        assert_eq!(form.phase(), FormPhase::StatusSelected);
        assert_eq!(form.selected_status_id(), 3);
    }

    #[tokio::test]
    async fn test_queue_failure_keeps_status_change() {
        let dispatch = RecordingDispatch::failing();
        let service = create_service(
            successful_idea_db(),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[in_progress()]]),
            &dispatch,
        );

        let outcome = service
            .set_status(&create_test_user("admin", true), "idea1", 3, true, None)
            .await
            .unwrap();

        assert_eq!(outcome.idea.status_id, 3);
        assert!(!outcome.voters_notification_queued);
    }
}
