//! Authorization policy for comments and admin actions.
//!
//! Every check takes the viewer as `Option<&user::Model>`; `None` is a guest
//! and is denied everything.

use ideaboard_db::entities::{comment, idea, user};
use serde::Serialize;

/// Whether the viewer is an administrator.
#[must_use]
pub fn is_admin(viewer: Option<&user::Model>) -> bool {
    viewer.is_some_and(|u| u.is_admin)
}

/// Whether the viewer may change an idea's status.
#[must_use]
pub fn can_set_status(viewer: Option<&user::Model>) -> bool {
    is_admin(viewer)
}

/// Whether the viewer may create user accounts.
#[must_use]
pub fn can_create_users(viewer: Option<&user::Model>) -> bool {
    is_admin(viewer)
}

/// Whether the viewer may delete an idea (owner or admin).
#[must_use]
pub fn can_delete_idea(viewer: Option<&user::Model>, idea: &idea::Model) -> bool {
    viewer.is_some_and(|u| u.is_admin || u.id == idea.user_id)
}

/// Whether the viewer may see spam report counts.
#[must_use]
pub fn can_view_spam_reports(viewer: Option<&user::Model>) -> bool {
    is_admin(viewer)
}

/// Whether the viewer may edit a comment (author or admin).
#[must_use]
pub fn can_update_comment(viewer: Option<&user::Model>, comment: &comment::Model) -> bool {
    viewer.is_some_and(|u| u.is_admin || u.id == comment.user_id)
}

/// Whether the viewer may delete a comment (author or admin).
#[must_use]
pub fn can_delete_comment(viewer: Option<&user::Model>, comment: &comment::Model) -> bool {
    can_update_comment(viewer, comment)
}

/// Whether the viewer may flag a comment as spam.
///
/// Any signed-in user except the comment's author.
#[must_use]
pub fn can_mark_as_spam(viewer: Option<&user::Model>, comment: &comment::Model) -> bool {
    viewer.is_some_and(|u| u.id != comment.user_id)
}

/// Whether the viewer may clear a comment's spam reports.
#[must_use]
pub fn can_mark_as_not_spam(viewer: Option<&user::Model>, comment: &comment::Model) -> bool {
    is_admin(viewer) && comment.spam_reports > 0
}

/// Every policy decision about one comment for one viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommentAbilities {
    pub update: bool,
    pub delete: bool,
    pub mark_as_spam: bool,
    pub mark_as_not_spam: bool,
    pub view_spam_reports: bool,
}

impl CommentAbilities {
    /// Evaluate the policy for `viewer` against `comment`.
    #[must_use]
    pub fn for_viewer(viewer: Option<&user::Model>, comment: &comment::Model) -> Self {
        Self {
            update: can_update_comment(viewer, comment),
            delete: can_delete_comment(viewer, comment),
            mark_as_spam: can_mark_as_spam(viewer, comment),
            mark_as_not_spam: can_mark_as_not_spam(viewer, comment),
            view_spam_reports: can_view_spam_reports(viewer),
        }
    }

    /// Whether any action menu entry applies.
    #[must_use]
    pub const fn has_any_action(&self) -> bool {
        self.update || self.delete || self.mark_as_spam || self.mark_as_not_spam
    }
}
