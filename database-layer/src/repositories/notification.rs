use sqlx::PgConnection;

use crate::models::{Notification, NotificationKind};
use crate::query::{Page, PaginatedQuery};
use crate::DatabaseResult as DbResult;

const NOTIFICATION_SELECT: &str =
    "SELECT id, user_id, title, message, kind, read, created_at FROM notifications WHERE 1=1";

const NOTIFICATION_COUNT: &str = "SELECT COUNT(*) FROM notifications WHERE 1=1";

/// Repository for in-app notifications
pub struct NotificationRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> NotificationRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &mut self,
        user_id: i64,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> DbResult<i64> {
        Ok(sqlx::query_scalar(
            "INSERT INTO notifications (user_id, title, message, kind) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(kind.as_str())
        .fetch_one(&mut *self.conn)
        .await?)
    }

    pub async fn list_for_user(
        &mut self,
        user_id: i64,
        unread_only: bool,
        page: Page,
    ) -> DbResult<(Vec<Notification>, i64)> {
        let mut query = PaginatedQuery::new(NOTIFICATION_SELECT, NOTIFICATION_COUNT);
        query
            .filter_eq("user_id", Some(user_id))
            .filter_eq("read", unread_only.then_some(false))
            .order_by("created_at", "DESC")
            .paginate(page);
        query.fetch_page(&mut *self.conn).await
    }

    /// Marks one of the user's notifications read. Returns the updated row,
    /// or None when it does not exist or belongs to someone else.
    pub async fn mark_read(&mut self, id: i64, user_id: i64) -> DbResult<Option<Notification>> {
        Ok(sqlx::query_as::<_, Notification>(
            r"
            UPDATE notifications SET read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, message, kind, read, created_at
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?)
    }

    pub async fn delete_for_user(&mut self, user_id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }
}
