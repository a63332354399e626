//! Notification endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use ideaboard_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser, middleware::AppState, response::ApiResponse, views::render_dropdown,
};

/// Unread badge count.
#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Ids the dropdown rendered when it was opened.
#[derive(Deserialize)]
pub struct MarkAllAsReadRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Result of a batch read.
#[derive(Serialize)]
pub struct MarkAllAsReadResponse {
    pub updated: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dropdown))
        .route("/count", get(unread_count))
        .route("/mark-all-as-read", post(mark_all_as_read))
        .route("/{id}", get(open))
}

/// Bell dropdown with the newest unread notifications.
async fn dropdown(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Html<String>> {
    let notifications = state.notification_service.unread_feed(&user.id).await?;
    let count = state.notification_service.unread_count(&user.id).await?;

    Ok(Html(render_dropdown(&notifications, count, chrono::Utc::now())?))
}

async fn unread_count(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.notification_service.unread_count(&user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

async fn mark_all_as_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<MarkAllAsReadRequest>,
) -> AppResult<ApiResponse<MarkAllAsReadResponse>> {
    let updated = state
        .notification_service
        .mark_all_as_read(&user.id, &request.ids)
        .await?;
    Ok(ApiResponse::ok(MarkAllAsReadResponse { updated }))
}

/// Mark one notification read and go to what it points at.
async fn open(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let target = state.notification_service.open(&user.id, &id).await?;
    Ok(Redirect::to(&target.location()))
}
