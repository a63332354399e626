//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum NotificationType {
    /// Someone commented on an idea the notifiee owns.
    #[sea_orm(string_value = "commentAdded")]
    CommentAdded,
    /// An idea the notifiee voted for changed status.
    #[sea_orm(string_value = "statusChanged")]
    StatusChanged,
}

/// Denormalized display data stored with a notification.
///
/// Captured at creation time so the feed renders without joins and keeps
/// showing what the recipient was told even if the idea is later renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub idea_slug: String,
    pub idea_title: String,
    pub user_avatar: String,
    pub user_name: String,
    pub comment_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    pub notifiee_id: String,

    /// The user who triggered the notification
    #[sea_orm(nullable)]
    pub notifier_id: Option<String>,

    /// Notification type
    pub notification_type: NotificationType,

    /// Related idea
    pub idea_id: String,

    /// Related comment
    #[sea_orm(nullable)]
    pub comment_id: Option<String>,

    /// Display payload (see [`NotificationData`])
    #[sea_orm(column_type = "JsonBinary")]
    pub data: Json,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Decode the display payload.
    pub fn payload(&self) -> Result<NotificationData, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::NotifieeId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Notifiee,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::NotifierId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Notifier,
}

impl ActiveModelBehavior for ActiveModel {}
