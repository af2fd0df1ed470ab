use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};

use super::{
    api::MentoringClient,
    error::ClientError,
    feed::NotificationFeed,
    poller::spawn_poller,
    push::{HubConnector, PushConnectionManager},
    Toast,
};
use crate::hub::HubMessage;

/// Everything a signed-in session needs for notifications: the seeded feed,
/// the push connection, and the polling fallback, all feeding one toast
/// channel.
pub struct NotificationCenter {
    client: MentoringClient,
    feed: NotificationFeed,
    push: PushConnectionManager,
    tasks: Vec<JoinHandle<()>>,
}

impl NotificationCenter {
    pub async fn start(
        client: MentoringClient,
        connector: Arc<dyn HubConnector>,
        user_id: i64,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let feed = NotificationFeed::new();
        match client.list_notifications(user_id).await {
            Ok(existing) => feed.seed(existing),
            Err(e) => tracing::warn!(user_id, "Initial notification fetch failed: {}", e),
        }

        let (toast_tx, toast_rx) = mpsc::unbounded_channel();
        let (hub_tx, hub_rx) = mpsc::unbounded_channel();

        let push = PushConnectionManager::new(connector, hub_tx);
        push.connect().await;

        let tasks = vec![
            tokio::spawn(forward_pushes(hub_rx, feed.clone(), toast_tx.clone())),
            spawn_poller(client.clone(), feed.clone(), user_id, poll_interval, toast_tx),
        ];

        let center = Self {
            client,
            feed,
            push,
            tasks,
        };
        (center, toast_rx)
    }

    pub fn feed(&self) -> &NotificationFeed {
        &self.feed
    }

    pub fn push(&self) -> &PushConnectionManager {
        &self.push
    }

    pub async fn mark_read(&self, notification_id: i64) -> Result<(), ClientError> {
        self.client.mark_notification_read(notification_id).await?;
        self.feed.mark_read(notification_id);
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        self.push.disconnect().await;
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn forward_pushes(
    mut messages: mpsc::UnboundedReceiver<HubMessage>,
    feed: NotificationFeed,
    toasts: mpsc::UnboundedSender<Toast>,
) {
    while let Some(message) = messages.recv().await {
        match message {
            HubMessage::ReceiveNotification(notification) => {
                if let Some(toast) = feed.ingest(notification) {
                    if toasts.send(toast).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{hub_message, notification, success, MockConnector, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_seeded_ids_never_toast_pushed_ones_do_once() {
        let transport = Arc::new(MockTransport::new());
        transport
            .respond(success(json!([notification(1, "Welcome")])))
            .respond(success(json!([notification(1, "Welcome"), notification(2, "Mentor assigned")])));
        let connector = Arc::new(MockConnector::scripted(vec![Ok(vec![
            hub_message(1, "Welcome"),
            hub_message(2, "Mentor assigned"),
        ])]));

        let (mut center, mut toasts) = NotificationCenter::start(
            MentoringClient::new(transport.clone()),
            connector,
            3,
            Duration::from_secs(60),
        )
        .await;

        assert_eq!(toasts.recv().await, Some(Toast::info("Mentor assigned")));

        // Let the immediate first poll run; id 2 must not toast again.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(toasts.try_recv().is_err());
        assert_eq!(center.feed().len(), 2);

        center.shutdown().await;
        assert!(!center.push().is_connected().await);
    }

    #[tokio::test]
    async fn test_mark_read_updates_feed() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(success(json!([notification(1, "Welcome")])));
        let (center, _toasts) = NotificationCenter::start(
            MentoringClient::new(transport.clone()),
            Arc::new(MockConnector::pending(Duration::ZERO)),
            3,
            Duration::from_secs(60),
        )
        .await;

        // The first poll tick runs against an empty queue; the reply below
        // is for mark-as-read.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut read = notification(1, "Welcome");
        read["isRead"] = json!(true);
        transport.respond(success(read));

        center.mark_read(1).await.unwrap();
        assert_eq!(center.feed().unread_count(), 0);
    }
}
