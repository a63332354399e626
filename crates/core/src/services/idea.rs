//! Idea service.

use crate::services::policy;
use ideaboard_common::{AppError, AppResult, IdGenerator};
use ideaboard_db::{
    entities::{category, idea, user, vote},
    repositories::{CategoryRepository, IdeaRepository, VoteRepository},
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Status every new idea starts in.
pub const DEFAULT_STATUS_ID: i32 = 1;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[^a-z0-9]+").unwrap()
});

/// Input for creating an idea.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIdeaInput {
    #[validate(length(min = 4, max = 255))]
    pub title: String,
    pub category_id: i32,
    #[validate(length(min = 4))]
    pub description: String,
}

/// Idea service for business logic.
#[derive(Clone)]
pub struct IdeaService {
    idea_repo: IdeaRepository,
    vote_repo: VoteRepository,
    category_repo: CategoryRepository,
    id_gen: IdGenerator,
}

impl IdeaService {
    /// Create a new idea service.
    #[must_use]
    pub const fn new(
        idea_repo: IdeaRepository,
        vote_repo: VoteRepository,
        category_repo: CategoryRepository,
    ) -> Self {
        Self {
            idea_repo,
            vote_repo,
            category_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get an idea by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<idea::Model> {
        self.idea_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::IdeaNotFound(slug.to_string()))
    }

    /// Get an idea by ID.
    pub async fn get(&self, id: &str) -> AppResult<idea::Model> {
        self.idea_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::IdeaNotFound(id.to_string()))
    }

    /// Category of an idea.
    pub async fn category(&self, idea: &idea::Model) -> AppResult<Option<category::Model>> {
        self.category_repo.find_by_id(idea.category_id).await
    }

    /// Most recent ideas, optionally only those in one status.
    pub async fn list_recent(&self, limit: u64, status_id: Option<i32>) -> AppResult<Vec<idea::Model>> {
        self.idea_repo.find_recent(limit, status_id).await
    }

    /// Create an idea. The author automatically votes for it.
    pub async fn create(&self, author: &user::Model, input: CreateIdeaInput) -> AppResult<idea::Model> {
        input.validate()?;

        if self.category_repo.find_by_id(input.category_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Unknown category: {}",
                input.category_id
            )));
        }

        let slug = self.unique_slug(&input.title).await?;
        let now = chrono::Utc::now();

        let model = idea::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(author.id.clone()),
            category_id: Set(input.category_id),
            status_id: Set(DEFAULT_STATUS_ID),
            title: Set(input.title),
            slug: Set(slug),
            description: Set(input.description),
            votes_count: Set(1),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };
        let idea = self.idea_repo.create(model).await?;

        self.vote_repo
            .create(vote::ActiveModel {
                id: Set(self.id_gen.generate()),
                idea_id: Set(idea.id.clone()),
                user_id: Set(author.id.clone()),
                created_at: Set(now.into()),
            })
            .await?;

        tracing::info!(idea_id = %idea.id, slug = %idea.slug, user_id = %author.id, "Created idea");
        Ok(idea)
    }

    /// Delete an idea with its votes, comments and notifications.
    pub async fn delete(&self, actor: &user::Model, idea: &idea::Model) -> AppResult<()> {
        if !policy::can_delete_idea(Some(actor), idea) {
            return Err(AppError::Forbidden("Cannot delete this idea".to_string()));
        }

        self.idea_repo.delete(&idea.id).await?;
        tracing::info!(idea_id = %idea.id, user_id = %actor.id, "Deleted idea");
        Ok(())
    }

    /// Pick a slug for `title` that no idea uses yet.
    async fn unique_slug(&self, title: &str) -> AppResult<String> {
        let base = slugify(title);
        let taken = self.idea_repo.count_slug_family(&base).await?;
        if taken == 0 {
            return Ok(base);
        }

        let mut n = taken + 1;
        loop {
            let candidate = format!("{base}-{n}");
            if self.idea_repo.find_by_slug(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

/// Lowercase ASCII slug with runs of other characters collapsed to `-`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        "idea".to_string()
    } else {
        slug.to_string()
    }
}
