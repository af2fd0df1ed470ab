use crate::{
    error::{AppError, Result},
    hub::{ConnectionManager, HubMessage},
    middleware::AuthUser,
};
use super::{notification_models::Notification, notification_repository::NotificationRepository};

/// Persists notifications and pushes them to the user's live hub streams.
#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    hub: ConnectionManager,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, hub: ConnectionManager) -> Self {
        Self { repo, hub }
    }

    pub async fn notify(&self, user_id: i64, message: &str) -> Result<Notification> {
        let notification = self
            .repo
            .record(user_id, message)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;

        let delivered = self
            .hub
            .send_to_user(user_id, HubMessage::ReceiveNotification(notification.clone()));
        tracing::debug!(
            notification_id = notification.id,
            user_id,
            delivered,
            "notification pushed"
        );

        Ok(notification)
    }

    /// A user's own notifications; admins may read anyone's.
    pub async fn list_for_user(&self, actor: AuthUser, user_id: i64) -> Result<Vec<Notification>> {
        if actor.id != user_id && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Cannot read another user's notifications".to_string(),
            ));
        }

        self.repo.inbox(user_id).await
    }

    pub async fn mark_as_read(&self, actor: AuthUser, id: i64) -> Result<Notification> {
        self.repo
            .acknowledge(id, actor.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }
}
