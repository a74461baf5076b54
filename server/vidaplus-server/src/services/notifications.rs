//! Best-effort in-app notifications
//!
//! Notifications are sent after the mutation that triggered them has
//! committed, in their own transaction. A failure is logged and never turns
//! the triggering request into an error.

use database_layer::models::NotificationKind;
use database_layer::repositories::NotificationRepository;
use database_layer::{DatabasePool, DatabaseResult, UnitOfWork};
use tracing::{debug, warn};

async fn insert(
    pool: &DatabasePool,
    user_id: i64,
    title: &str,
    message: &str,
    kind: NotificationKind,
) -> DatabaseResult<i64> {
    let mut uow = UnitOfWork::begin(pool).await?;
    let id = NotificationRepository::new(uow.conn())
        .create(user_id, title, message, kind)
        .await?;
    uow.commit().await?;
    Ok(id)
}

/// Sends a notification to `user_id`. Returns whether it was stored.
pub async fn notify(
    pool: &DatabasePool,
    user_id: i64,
    title: &str,
    message: &str,
    kind: NotificationKind,
) -> bool {
    match insert(pool, user_id, title, message, kind).await {
        Ok(id) => {
            debug!(user_id, notification_id = id, kind = %kind, "Notification sent");
            true
        }
        Err(e) => {
            warn!(user_id, kind = %kind, error = %e, "Failed to send notification");
            false
        }
    }
}
