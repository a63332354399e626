//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use ideaboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// All comments on an idea in posting order.
    pub async fn find_by_idea(&self, idea_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::IdeaId.eq(idea_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent comment announcing `status_id` on an idea.
    pub async fn find_latest_status_update(
        &self,
        idea_id: &str,
        status_id: i32,
    ) -> AppResult<Option<comment::Model>> {
        Comment::find()
            .filter(comment::Column::IdeaId.eq(idea_id))
            .filter(comment::Column::IsStatusUpdate.eq(true))
            .filter(comment::Column::StatusId.eq(status_id))
            .order_by_desc(comment::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace a comment's body.
    pub async fn update_body(&self, existing: comment::Model, body: String) -> AppResult<comment::Model> {
        let mut active: comment::ActiveModel = existing.into();
        active.body = Set(body);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Add one spam report to a comment.
    pub async fn increment_spam_reports(&self, id: &str) -> AppResult<()> {
        Comment::update_many()
            .col_expr(
                comment::Column::SpamReports,
                Expr::col(comment::Column::SpamReports).add(1),
            )
            .filter(comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Clear a comment's spam reports.
    pub async fn reset_spam_reports(&self, id: &str) -> AppResult<()> {
        Comment::update_many()
            .col_expr(comment::Column::SpamReports, Expr::value(0))
            .filter(comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
