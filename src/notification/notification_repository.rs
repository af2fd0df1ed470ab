use crate::error::Result;
use sqlx::PgPool;
use super::notification_models::Notification;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, is_read, created_at";

/// Per-user inbox rows. Every statement is scoped to the recipient.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a message for `recipient_id`; `None` when no such user exists.
    pub async fn record(&self, recipient_id: i64, message: &str) -> Result<Option<Notification>> {
        let sql = format!(
            "INSERT INTO notifications (user_id, message)
             SELECT id, $2 FROM users WHERE id = $1
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(recipient_id)
            .bind(message)
            .fetch_optional(&self.pool)
            .await?;

        Ok(notification)
    }

    /// Newest first; ids break ties between rows written in the same instant.
    pub async fn inbox(&self, recipient_id: i64) -> Result<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(recipient_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    /// Marks one of the recipient's own notifications read. Repeating it is
    /// harmless; someone else's id yields `None`.
    pub async fn acknowledge(&self, id: i64, recipient_id: i64) -> Result<Option<Notification>> {
        let sql = format!(
            "UPDATE notifications SET is_read = TRUE
             WHERE id = $1 AND user_id = $2
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .bind(recipient_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(notification)
    }
}
