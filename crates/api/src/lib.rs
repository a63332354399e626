//! HTTP layer for ideaboard.
//!
//! - **Endpoints**: idea pages, votes, comments, status changes, notifications
//! - **Extractors**: bearer-token authentication
//! - **Views**: server-rendered HTML fragments with explicit escaping
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod views;

pub use endpoints::{app, router};
pub use middleware::AppState;
