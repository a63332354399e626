//! Notification bell dropdown.

use askama::Template;
use chrono::{DateTime, Utc};
use ideaboard_common::AppResult;
use ideaboard_db::entities::notification::{self, NotificationType};

use super::format::relative_time;

struct NotificationItem {
    id: String,
    avatar: String,
    user_name: String,
    idea_title: String,
    is_status_change: bool,
    status_name: String,
    excerpt: String,
    datetime: String,
    ago: String,
}

#[derive(Template)]
#[template(path = "notifications.html")]
struct DropdownTemplate {
    unread_count: u64,
    items: Vec<NotificationItem>,
    /// Comma-separated ids sent back by "Mark all as read".
    fetched_ids: String,
}

/// Render the bell with its unread badge and the dropdown list.
pub fn render_dropdown(
    notifications: &[notification::Model],
    unread_count: u64,
    now: DateTime<Utc>,
) -> AppResult<String> {
    let items: Vec<NotificationItem> = notifications
        .iter()
        .filter_map(|n| to_item(n, now))
        .collect();
    let fetched_ids = items
        .iter()
        .map(|item| item.id.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let template = DropdownTemplate {
        unread_count,
        items,
        fetched_ids,
    };
    Ok(template.render()?)
}

fn to_item(notification: &notification::Model, now: DateTime<Utc>) -> Option<NotificationItem> {
    let data = match notification.payload() {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(notification_id = %notification.id, error = %e, "Skipping notification with unreadable payload");
            return None;
        }
    };

    Some(NotificationItem {
        id: notification.id.clone(),
        avatar: data.user_avatar,
        user_name: data.user_name,
        idea_title: data.idea_title,
        is_status_change: notification.notification_type == NotificationType::StatusChanged,
        status_name: data.status_name.unwrap_or_else(|| "a new status".to_string()),
        excerpt: data.comment_body,
        datetime: notification.created_at.to_rfc3339(),
        ago: relative_time(&notification.created_at, now),
    })
}
