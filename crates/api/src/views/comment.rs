//! Comment renderer.

use askama::Template;
use chrono::{DateTime, Utc};
use ideaboard_common::AppResult;
use ideaboard_core::{
    CommentAbilities, CommentView,
    services::{idea::slugify, user::avatar_url},
};
use ideaboard_db::entities::user;

use super::format::{relative_time, text_lines};

/// Who is looking at the comment, and on which idea.
#[derive(Debug, Clone, Copy)]
pub struct CommentContext<'a> {
    /// Owner of the idea the comment belongs to.
    pub idea_owner_id: &'a str,
    pub viewer: Option<&'a user::Model>,
    pub now: DateTime<Utc>,
}

/// A button in the comment's action menu.
struct CommentAction {
    signal: &'static str,
    label: &'static str,
}

#[derive(Template)]
#[template(path = "comment.html")]
struct CommentTemplate {
    id: String,
    classes: String,
    avatar: String,
    author_name: String,
    author_is_admin: bool,
    author_is_op: bool,
    /// Zero unless the viewer may see the count.
    spam_reports: i32,
    is_status_update: bool,
    status_name: String,
    body_lines: Vec<String>,
    datetime: String,
    ago: String,
    show_actions: bool,
    actions: Vec<CommentAction>,
}

/// Render one comment as an HTML fragment.
pub fn render_comment(view: &CommentView, ctx: &CommentContext<'_>) -> AppResult<String> {
    let comment = &view.comment;
    let author = &view.author;
    let abilities = CommentAbilities::for_viewer(ctx.viewer, comment);
    let status = view.status.as_ref().filter(|_| comment.is_status_update);

    let classes = match status {
        Some(status) => format!("comment is-status-update status-{}", slugify(&status.name)),
        None => "comment".to_string(),
    };
    let actions = action_menu(&abilities);

    let template = CommentTemplate {
        id: comment.id.clone(),
        classes,
        avatar: avatar_url(author),
        author_name: author.name.clone(),
        author_is_admin: author.is_admin,
        author_is_op: author.id == ctx.idea_owner_id,
        spam_reports: if abilities.view_spam_reports {
            comment.spam_reports
        } else {
            0
        },
        is_status_update: status.is_some(),
        status_name: status.map(|s| s.name.clone()).unwrap_or_default(),
        body_lines: text_lines(&comment.body),
        datetime: comment.created_at.to_rfc3339(),
        ago: relative_time(&comment.created_at, ctx.now),
        show_actions: ctx.viewer.is_some() && abilities.has_any_action(),
        actions,
    };

    Ok(template.render()?)
}

fn action_menu(abilities: &CommentAbilities) -> Vec<CommentAction> {
    [
        (abilities.update, "setEditComment", "Edit Comment"),
        (abilities.delete, "setDeleteComment", "Delete Comment"),
        (abilities.mark_as_spam, "setMarkAsSpamComment", "Mark as Spam"),
        (abilities.mark_as_not_spam, "setMarkAsNotSpamComment", "Not Spam"),
    ]
    .into_iter()
    .filter(|(allowed, _, _)| *allowed)
    .map(|(_, signal, label)| CommentAction { signal, label })
    .collect()
}
