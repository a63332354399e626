//! User endpoints.

use axum::{Json, Router, extract::State, routing::{get, post}};
use ideaboard_common::AppResult;
use ideaboard_core::{CreateUserInput, services::user::avatar_url};
use ideaboard_db::entities::user;
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Created},
};

/// Public user profile.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub is_admin: bool,
}

impl From<&user::Model> for UserResponse {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            avatar_url: avatar_url(user),
            is_admin: user.is_admin,
        }
    }
}

/// A newly created user with its access token.
#[derive(Serialize)]
pub struct CreatedUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/me", get(me))
}

/// Create an account. Admins only; the response carries the new token.
async fn create_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Created<CreatedUserResponse>> {
    let user = state.user_service.create(&admin, input).await?;

    Ok(Created(CreatedUserResponse {
        user: UserResponse::from(&user),
        token: user.token,
    }))
}

async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(UserResponse::from(&user))
}
