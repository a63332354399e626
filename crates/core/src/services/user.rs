//! User service.

use crate::services::policy;
use ideaboard_common::{AppError, AppResult, IdGenerator};
use ideaboard_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a user with a freshly issued access token. Admins only.
    pub async fn create(&self, actor: &user::Model, input: CreateUserInput) -> AppResult<user::Model> {
        if !policy::can_create_users(Some(actor)) {
            return Err(AppError::Forbidden("Only admins can create users".to_string()));
        }
        input.validate()?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            email: Set(input.email.to_lowercase()),
            avatar_url: Set(input.avatar_url),
            token: Set(Some(self.id_gen.generate_token())),
            is_admin: Set(input.is_admin),
            created_at: Set(chrono::Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "Created user");
        Ok(user)
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}

/// Avatar URL for a user: the stored URL, or a Gravatar derived from the email.
#[must_use]
pub fn avatar_url(user: &user::Model) -> String {
    match &user.avatar_url {
        Some(url) if !url.is_empty() => url.clone(),
        _ => {
            let digest = md5::compute(user.email.trim().to_lowercase().as_bytes());
            format!("https://www.gravatar.com/avatar/{digest:x}?s=200&d=identicon")
        }
    }
}
