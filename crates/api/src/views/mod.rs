//! Server-rendered HTML fragments, backed by the askama templates in `templates/`.

pub mod comment;
pub mod format;
pub mod idea;
pub mod notifications;
pub mod set_status;

pub use comment::{CommentContext, render_comment};
pub use idea::{IdeaPage, render_idea_page, render_index};
pub use notifications::render_dropdown;
pub use set_status::render_set_status;
