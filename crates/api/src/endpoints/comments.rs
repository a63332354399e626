//! Comment command endpoint.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use ideaboard_common::AppResult;
use ideaboard_core::{CommentCommand, CommentCommandOutcome};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/commands", post(execute))
}

/// Run an action menu command (`edit`, `delete`, `markAsSpam`, `markAsNotSpam`).
async fn execute(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(command): Json<CommentCommand>,
) -> AppResult<ApiResponse<CommentCommandOutcome>> {
    let outcome = state.comment_service.execute(&user, &id, command).await?;
    Ok(ApiResponse::ok(outcome))
}
