//! HTTP endpoints.

mod comments;
mod ideas;
mod notifications;
mod users;

use axum::{Router, middleware::from_fn_with_state};

use crate::middleware::{AppState, auth_middleware};

/// Create the router without state.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(ideas::router())
        .nest("/comments", comments::router())
        .nest("/notifications", notifications::router())
        .nest("/users", users::router())
}

/// Router with authentication applied and state attached.
pub fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
