//! Idea repository.

use std::sync::Arc;

use crate::entities::{Idea, comment, idea};
use ideaboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// A status change as committed by [`IdeaRepository::update_status_with_comment`].
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub idea: idea::Model,
    pub comment: comment::Model,
    /// Status the idea had when its row was locked.
    pub previous_status_id: i32,
}

/// Idea repository for database operations.
#[derive(Clone)]
pub struct IdeaRepository {
    db: Arc<DatabaseConnection>,
}

impl IdeaRepository {
    /// Create a new idea repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an idea by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<idea::Model>> {
        Idea::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an idea by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<idea::Model>> {
        Idea::find()
            .filter(idea::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count ideas whose slug is `base` or `base-<n>`.
    pub async fn count_slug_family(&self, base: &str) -> AppResult<u64> {
        Idea::find()
            .filter(
                idea::Column::Slug
                    .eq(base)
                    .or(idea::Column::Slug.starts_with(format!("{base}-"))),
            )
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List ideas, newest first.
    pub async fn find_recent(&self, limit: u64, status_id: Option<i32>) -> AppResult<Vec<idea::Model>> {
        let mut query = Idea::find().order_by_desc(idea::Column::Id);

        if let Some(status_id) = status_id {
            query = query.filter(idea::Column::StatusId.eq(status_id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new idea.
    pub async fn create(&self, model: idea::ActiveModel) -> AppResult<idea::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an idea (comments, votes cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Idea::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Set an idea's status and record the announcing comment in one transaction.
    ///
    /// The idea row stays locked until commit, so concurrent submissions of
    /// the same change serialize and all but the first fail with
    /// "Status is the same". Returns [`AppError::IdeaNotFound`] if the idea no
    /// longer exists. Nothing is written on error.
    pub async fn update_status_with_comment(
        &self,
        idea_id: &str,
        status_id: i32,
        status_comment: comment::ActiveModel,
    ) -> AppResult<StatusUpdate> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let idea = Idea::find_by_id(idea_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::IdeaNotFound(idea_id.to_string()))?;

        let previous_status_id = idea.status_id;
        if previous_status_id == status_id {
            return Err(AppError::Validation("Status is the same".to_string()));
        }

        let mut active: idea::ActiveModel = idea.into();
        active.status_id = Set(status_id);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let idea = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let comment = status_comment
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(StatusUpdate {
            idea,
            comment,
            previous_status_id,
        })
    }
}
