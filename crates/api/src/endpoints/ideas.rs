//! Idea endpoints: pages, votes, comments and status changes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use ideaboard_common::AppResult;
use ideaboard_core::{
    CommentInput, CommentView, CreateIdeaInput, FormPhase, SetStatusForm, SetStatusRequest,
    StatusWasUpdated,
};
use ideaboard_db::entities::idea;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Created},
    views::{CommentContext, IdeaPage, render_comment, render_idea_page, render_index},
};

const INDEX_LIMIT: u64 = 50;

/// Index filter.
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub status: Option<i32>,
}

/// Idea response.
#[derive(Serialize)]
pub struct IdeaResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub category_id: i32,
    pub status_id: i32,
    pub votes_count: i32,
    pub created_at: String,
}

impl From<idea::Model> for IdeaResponse {
    fn from(idea: idea::Model) -> Self {
        Self {
            id: idea.id,
            slug: idea.slug,
            title: idea.title,
            category_id: idea.category_id,
            status_id: idea.status_id,
            votes_count: idea.votes_count,
            created_at: idea.created_at.to_rfc3339(),
        }
    }
}

/// Vote state after a vote or unvote.
#[derive(Serialize)]
pub struct VoteResponse {
    pub idea_id: String,
    pub voted: bool,
}

/// A posted comment with its rendered markup.
#[derive(Serialize)]
pub struct CommentCreatedResponse {
    pub comment_id: String,
    pub html: String,
}

/// Result of a status change.
#[derive(Serialize)]
pub struct StatusChangeResponse {
    pub event: StatusWasUpdated,
    pub phase: FormPhase,
    pub voters_notification_queued: bool,
    pub comment_html: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/ideas", post(create_idea))
        .route("/ideas/{slug}", get(show).delete(delete_idea))
        .route("/ideas/{slug}/vote", post(vote).delete(unvote))
        .route("/ideas/{slug}/comments", post(add_comment))
        .route("/ideas/{slug}/status", post(set_status))
}

async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> AppResult<Html<String>> {
    let ideas = state
        .idea_service
        .list_recent(INDEX_LIMIT, query.status)
        .await?;
    let statuses = state.status_service.list().await?;

    Ok(Html(render_index(&state.board_name, &ideas, &statuses)?))
}

async fn show(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let idea = state.idea_service.get_by_slug(&slug).await?;
    let category = state.idea_service.category(&idea).await?;
    let statuses = state.status_service.list().await?;
    let comments = state.comment_service.list_for_idea(&idea.id).await?;
    let has_voted = match &viewer {
        Some(user) => state.vote_service.has_voted(&idea.id, &user.id).await?,
        None => false,
    };

    Ok(Html(render_idea_page(&IdeaPage {
        board_name: &state.board_name,
        idea: &idea,
        category: category.as_ref(),
        statuses: &statuses,
        comments: &comments,
        viewer: viewer.as_ref(),
        has_voted,
        now: chrono::Utc::now(),
    })?))
}

async fn create_idea(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<CreateIdeaInput>,
) -> AppResult<Created<IdeaResponse>> {
    let idea = state.idea_service.create(&user, input).await?;
    Ok(Created(idea.into()))
}

async fn delete_idea(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    let idea = state.idea_service.get_by_slug(&slug).await?;
    state.idea_service.delete(&user, &idea).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn vote(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<VoteResponse>> {
    let idea = state.idea_service.get_by_slug(&slug).await?;
    state.vote_service.vote(&idea, &user.id).await?;

    Ok(ApiResponse::ok(VoteResponse {
        idea_id: idea.id,
        voted: true,
    }))
}

async fn unvote(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<VoteResponse>> {
    let idea = state.idea_service.get_by_slug(&slug).await?;
    state.vote_service.unvote(&idea, &user.id).await?;

    Ok(ApiResponse::ok(VoteResponse {
        idea_id: idea.id,
        voted: false,
    }))
}

async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    Json(input): Json<CommentInput>,
) -> AppResult<Created<CommentCreatedResponse>> {
    let idea = state.idea_service.get_by_slug(&slug).await?;
    let comment = state.comment_service.create(&user, &idea, input).await?;

    let html = render_comment(
        &CommentView {
            comment: comment.clone(),
            author: user.clone(),
            status: None,
        },
        &CommentContext {
            idea_owner_id: &idea.user_id,
            viewer: Some(&user),
            now: chrono::Utc::now(),
        },
    )?;

    Ok(Created(CommentCreatedResponse {
        comment_id: comment.id,
        html,
    }))
}

async fn set_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    Json(request): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<StatusChangeResponse>> {
    let idea = state.idea_service.get_by_slug(&slug).await?;

    let mut form = SetStatusForm::for_idea(&idea);
    form.apply(request);
    let outcome = state.status_service.submit(&user, &mut form).await?;

    let comment_html = render_comment(
        &CommentView {
            comment: outcome.comment,
            author: user.clone(),
            status: Some(outcome.status),
        },
        &CommentContext {
            idea_owner_id: &outcome.idea.user_id,
            viewer: Some(&user),
            now: chrono::Utc::now(),
        },
    )?;

    Ok(ApiResponse::ok(StatusChangeResponse {
        event: outcome.event,
        phase: form.phase(),
        voters_notification_queued: outcome.voters_notification_queued,
        comment_html,
    }))
}
