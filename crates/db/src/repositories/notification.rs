//! Notification repository.

use std::sync::Arc;

use crate::entities::{Notification, notification};
use ideaboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, UpdateMany,
};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new notification.
    pub async fn create(&self, model: notification::ActiveModel) -> AppResult<notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a batch of notifications in one statement.
    pub async fn create_many(&self, models: Vec<notification::ActiveModel>) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        Notification::insert_many(models)
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Unread notifications for a user, newest first.
    pub async fn find_unread_by_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<notification::Model>> {
        unread_feed_query(user_id, limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, existing: notification::Model) -> AppResult<notification::Model> {
        if existing.is_read {
            return Ok(existing);
        }

        let mut active: notification::ActiveModel = existing.into();
        active.is_read = Set(true);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark the given unread notifications of a user as read in one update.
    ///
    /// Ids that belong to someone else or are already read are left alone.
    pub async fn mark_many_as_read(&self, user_id: &str, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = mark_many_as_read_query(user_id, ids)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::NotifieeId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Unread feed of one user. Ids break ties between rows created in the same instant.
fn unread_feed_query(user_id: &str, limit: u64) -> Select<Notification> {
    Notification::find()
        .filter(notification::Column::NotifieeId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .limit(limit)
}

fn mark_many_as_read_query(user_id: &str, ids: &[String]) -> UpdateMany<Notification> {
    Notification::update_many()
        .filter(notification::Column::NotifieeId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .filter(notification::Column::Id.is_in(ids.iter().cloned()))
        .col_expr(notification::Column::IsRead, true.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::notification::NotificationType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    fn create_test_notification(id: &str, is_read: bool) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            notifiee_id: "voter".to_string(),
            notifier_id: Some("admin".to_string()),
            notification_type: NotificationType::StatusChanged,
            idea_id: "idea1".to_string(),
            comment_id: Some("c1".to_string()),
            data: serde_json::json!({}),
            is_read,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_many_empty_skips_database() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = NotificationRepository::new(db);
        assert_eq!(repo.create_many(vec![]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_as_read_already_read_is_noop() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = NotificationRepository::new(db);
        let read = repo
            .mark_as_read(create_test_notification("n1", true))
            .await
            .unwrap();

        assert!(read.is_read);
    }

    #[tokio::test]
    async fn test_mark_many_as_read() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let ids = ["n3", "n2", "n1"].map(str::to_string);
        assert_eq!(repo.mark_many_as_read("voter", &ids).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_mark_many_as_read_without_ids_skips_database() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = NotificationRepository::new(db);
        assert_eq!(repo.mark_many_as_read("voter", &[]).await.unwrap(), 0);
    }

    #[test]
    fn test_mark_many_as_read_only_touches_listed_ids() {
        let ids = ["n2", "n1"].map(str::to_string);
        let sql = mark_many_as_read_query("voter", &ids)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""notifiee_id" = 'voter'"#));
        assert!(sql.contains(r#""is_read" = FALSE"#));
        assert!(sql.contains(r#""id" IN ('n2', 'n1')"#));
    }

    #[test]
    fn test_unread_feed_orders_by_creation_time() {
        let sql = unread_feed_query("voter", 20)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(
            r#"ORDER BY "notification"."created_at" DESC, "notification"."id" DESC"#
        ));
        assert!(sql.contains("LIMIT 20"));
    }

    #[tokio::test]
    async fn test_find_unread_by_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_notification("n2", false),
                    create_test_notification("n1", false),
                ]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let unread = repo.find_unread_by_user("voter", 20).await.unwrap();

        assert_eq!(unread.len(), 2);
        assert_eq!(unread[0].id, "n2");
    }
}
