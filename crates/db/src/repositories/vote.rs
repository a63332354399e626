//! Vote repository.

use std::sync::Arc;

use crate::entities::{Idea, Vote, idea, vote};
use ideaboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Insert,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, OnConflict},
};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's vote on an idea.
    pub async fn find_by_idea_and_user(
        &self,
        idea_id: &str,
        user_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::IdeaId.eq(idea_id))
            .filter(vote::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a user has voted for an idea.
    pub async fn is_voted(&self, idea_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self.find_by_idea_and_user(idea_id, user_id).await?.is_some())
    }

    /// Record a vote.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a vote and bump the idea's vote count in one transaction.
    ///
    /// Returns `None` without writing anything when the user already voted,
    /// including when a concurrent request inserted the same pair first.
    pub async fn add_vote(&self, vote: vote::Model) -> AppResult<Option<vote::Model>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let inserted = insert_unless_voted(&vote)
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if inserted == 0 {
            return Ok(None);
        }

        add_to_votes_count(&txn, &vote.idea_id, 1).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(vote))
    }

    /// Remove a user's vote and decrement the idea's vote count in one
    /// transaction. Returns `false` when there was no vote to remove.
    pub async fn remove_vote(&self, idea_id: &str, user_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let removed = Vote::delete_many()
            .filter(vote::Column::IdeaId.eq(idea_id))
            .filter(vote::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .rows_affected;

        if removed == 0 {
            return Ok(false);
        }

        add_to_votes_count(&txn, idea_id, -1).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// IDs of every user who voted for an idea, oldest vote first.
    pub async fn find_voter_ids(&self, idea_id: &str) -> AppResult<Vec<String>> {
        Vote::find()
            .select_only()
            .column(vote::Column::UserId)
            .filter(vote::Column::IdeaId.eq(idea_id))
            .order_by_asc(vote::Column::Id)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Insert a vote, skipping it if the `(idea_id, user_id)` pair exists.
fn insert_unless_voted(vote: &vote::Model) -> Insert<vote::ActiveModel> {
    Vote::insert(vote::ActiveModel {
        id: Set(vote.id.clone()),
        idea_id: Set(vote.idea_id.clone()),
        user_id: Set(vote.user_id.clone()),
        created_at: Set(vote.created_at),
    })
    .on_conflict(
        OnConflict::columns([vote::Column::IdeaId, vote::Column::UserId])
            .do_nothing()
            .to_owned(),
    )
}

/// Adjust the denormalized vote count in place.
async fn add_to_votes_count<C: ConnectionTrait>(db: &C, idea_id: &str, delta: i32) -> AppResult<()> {
    Idea::update_many()
        .col_expr(
            idea::Column::VotesCount,
            Expr::col(idea::Column::VotesCount).add(delta),
        )
        .filter(idea::Column::Id.eq(idea_id))
        .exec(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(())
}
