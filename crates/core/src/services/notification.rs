//! Notification service.

use crate::services::user::avatar_url;
use ideaboard_common::{AppError, AppResult, IdGenerator, config::BoardConfig};
use ideaboard_db::{
    entities::{
        comment, idea,
        notification::{self, NotificationData, NotificationType},
        user,
    },
    repositories::{
        CommentRepository, IdeaRepository, NotificationRepository, StatusRepository,
        UserRepository, VoteRepository,
    },
};
use sea_orm::Set;

/// Where opening a notification takes the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationTarget {
    /// The idea page, anchored at the comment when there is one.
    Idea {
        slug: String,
        comment_id: Option<String>,
    },
    /// The idea is gone; fall back to the index.
    Index,
}

impl NotificationTarget {
    /// Path to redirect to.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::Idea {
                slug,
                comment_id: Some(comment_id),
            } => format!("/ideas/{slug}#comment-{comment_id}"),
            Self::Idea {
                slug,
                comment_id: None,
            } => format!("/ideas/{slug}"),
            Self::Index => "/".to_string(),
        }
    }
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    idea_repo: IdeaRepository,
    vote_repo: VoteRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    status_repo: StatusRepository,
    page_size: u64,
    excerpt_length: usize,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service with default board settings.
    #[must_use]
    pub fn new(
        notification_repo: NotificationRepository,
        idea_repo: IdeaRepository,
        vote_repo: VoteRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
        status_repo: StatusRepository,
    ) -> Self {
        let board = BoardConfig::default();
        Self {
            notification_repo,
            idea_repo,
            vote_repo,
            comment_repo,
            user_repo,
            status_repo,
            page_size: board.notification_page_size,
            excerpt_length: board.comment_excerpt_length,
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply the board's feed size and excerpt length.
    #[must_use]
    pub fn with_board_config(mut self, board: &BoardConfig) -> Self {
        self.page_size = board.notification_page_size;
        self.excerpt_length = board.comment_excerpt_length;
        self
    }

    /// Unread notifications for the bell dropdown, newest first.
    pub async fn unread_feed(&self, user_id: &str) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_unread_by_user(user_id, self.page_size)
            .await
    }

    /// Unread badge count.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark the notifications the dropdown fetched as read.
    ///
    /// Only the listed ids change, so anything that arrived after the feed
    /// was rendered stays unread.
    pub async fn mark_all_as_read(&self, user_id: &str, fetched_ids: &[String]) -> AppResult<u64> {
        if u64::try_from(fetched_ids.len()).unwrap_or(u64::MAX) > self.page_size {
            return Err(AppError::BadRequest(format!(
                "At most {} notifications can be marked at once",
                self.page_size
            )));
        }

        let updated = self
            .notification_repo
            .mark_many_as_read(user_id, fetched_ids)
            .await?;
        tracing::debug!(user_id = %user_id, updated, "Marked notifications as read");
        Ok(updated)
    }

    /// Mark one of the user's notifications read and resolve where it points.
    pub async fn open(&self, user_id: &str, notification_id: &str) -> AppResult<NotificationTarget> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .filter(|n| n.notifiee_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("notification {notification_id}")))?;

        let notification = self.notification_repo.mark_as_read(notification).await?;

        let Some(idea) = self.idea_repo.find_by_id(&notification.idea_id).await? else {
            return Ok(NotificationTarget::Index);
        };

        Ok(NotificationTarget::Idea {
            slug: idea.slug,
            comment_id: notification.comment_id,
        })
    }

    /// Tell an idea's owner that someone commented on it.
    ///
    /// Returns `None` when the owner commented on their own idea.
    pub async fn notify_comment_added(
        &self,
        idea: &idea::Model,
        comment: &comment::Model,
        author: &user::Model,
    ) -> AppResult<Option<notification::Model>> {
        if idea.user_id == author.id {
            return Ok(None);
        }

        let data = self.payload(idea, author, &comment.body, None);
        let model = self.build(
            &idea.user_id,
            Some(&author.id),
            NotificationType::CommentAdded,
            idea,
            Some(&comment.id),
            &data,
        )?;

        let notification = self.notification_repo.create(model).await?;
        tracing::debug!(
            notification_id = %notification.id,
            idea_id = %idea.id,
            notifiee_id = %idea.user_id,
            "Created comment notification"
        );
        Ok(Some(notification))
    }

    /// Notify every voter of an idea that its status changed.
    ///
    /// The acting admin is skipped. A missing idea is not an error: nothing
    /// is sent. Returns the number of notifications created.
    pub async fn notify_voters_of_status_change(
        &self,
        idea_id: &str,
        status_id: i32,
        actor_id: &str,
    ) -> AppResult<u64> {
        let Some(idea) = self.idea_repo.find_by_id(idea_id).await? else {
            tracing::info!(idea_id = %idea_id, "Idea no longer exists, skipping voter notifications");
            return Ok(0);
        };

        let status = self
            .status_repo
            .find_by_id(status_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("status {status_id}")))?;

        let actor = self.user_repo.find_by_id(actor_id).await?;
        let announcement = self
            .comment_repo
            .find_latest_status_update(&idea.id, status_id)
            .await?;

        let voter_ids: Vec<String> = self
            .vote_repo
            .find_voter_ids(&idea.id)
            .await?
            .into_iter()
            .filter(|id| id != actor_id)
            .collect();

        if voter_ids.is_empty() {
            tracing::debug!(idea_id = %idea.id, "No voters to notify");
            return Ok(0);
        }

        let body = announcement.as_ref().map_or("", |c| c.body.as_str());
        let data = match &actor {
            Some(actor) => self.payload(&idea, actor, body, Some(status.name.clone())),
            None => NotificationData {
                idea_slug: idea.slug.clone(),
                idea_title: idea.title.clone(),
                user_avatar: String::new(),
                user_name: "An administrator".to_string(),
                comment_body: excerpt(body, self.excerpt_length),
                status_name: Some(status.name.clone()),
            },
        };
        let notifier_id = actor.as_ref().map(|a| a.id.as_str());
        let comment_id = announcement.as_ref().map(|c| c.id.as_str());

        let models = voter_ids
            .iter()
            .map(|voter_id| {
                self.build(
                    voter_id,
                    notifier_id,
                    NotificationType::StatusChanged,
                    &idea,
                    comment_id,
                    &data,
                )
            })
            .collect::<AppResult<Vec<_>>>()?;

        let created = self.notification_repo.create_many(models).await?;
        tracing::info!(
            idea_id = %idea.id,
            status = %status.name,
            created,
            "Notified voters of status change"
        );
        Ok(created)
    }

    fn payload(
        &self,
        idea: &idea::Model,
        actor: &user::Model,
        body: &str,
        status_name: Option<String>,
    ) -> NotificationData {
        NotificationData {
            idea_slug: idea.slug.clone(),
            idea_title: idea.title.clone(),
            user_avatar: avatar_url(actor),
            user_name: actor.name.clone(),
            comment_body: excerpt(body, self.excerpt_length),
            status_name,
        }
    }

    fn build(
        &self,
        notifiee_id: &str,
        notifier_id: Option<&str>,
        notification_type: NotificationType,
        idea: &idea::Model,
        comment_id: Option<&str>,
        data: &NotificationData,
    ) -> AppResult<notification::ActiveModel> {
        let data = serde_json::to_value(data).map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            notifiee_id: Set(notifiee_id.to_string()),
            notifier_id: Set(notifier_id.map(ToString::to_string)),
            notification_type: Set(notification_type),
            idea_id: Set(idea.id.clone()),
            comment_id: Set(comment_id.map(ToString::to_string)),
            data: Set(data),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        })
    }
}

/// First `limit` characters of `body`, with `...` appended when cut.
#[must_use]
pub fn excerpt(body: &str, limit: usize) -> String {
    if body.chars().count() <= limit {
        return body.to_string();
    }

    let mut cut: String = body.chars().take(limit).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str("...");
    cut
}
