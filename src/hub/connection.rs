use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::HubMessage;

pub type HubSender = mpsc::UnboundedSender<HubMessage>;

/// Live push-channel subscriptions, keyed by user. A user may hold several
/// at once (one per open tab or device).
#[derive(Clone)]
pub struct ConnectionManager {
    connections: Arc<DashMap<i64, Vec<(Uuid, HubSender)>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Register a subscription and return its id for later removal
    pub fn add_connection(&self, user_id: i64, sender: HubSender) -> Uuid {
        let connection_id = Uuid::new_v4();
        self.connections
            .entry(user_id)
            .or_default()
            .push((connection_id, sender));
        tracing::info!(user_id, %connection_id, "hub subscription opened");
        connection_id
    }

    pub fn remove_connection(&self, user_id: i64, connection_id: Uuid) {
        self.connections.remove_if_mut(&user_id, |_, senders| {
            senders.retain(|(id, _)| *id != connection_id);
            senders.is_empty()
        });
        tracing::info!(user_id, %connection_id, "hub subscription closed");
    }

    /// Send to every live subscription of the user; returns how many accepted
    /// the message. Closed subscriptions are pruned on the way.
    pub fn send_to_user(&self, user_id: i64, message: HubMessage) -> usize {
        let mut delivered = 0;
        self.connections.remove_if_mut(&user_id, |_, senders| {
            senders.retain(|(_, sender)| {
                let ok = sender.send(message.clone()).is_ok();
                if ok {
                    delivered += 1;
                }
                ok
            });
            senders.is_empty()
        });
        delivered
    }

    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.connections.contains_key(&user_id)
    }

    pub fn online_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes its subscription from the manager when dropped.
pub struct SubscriptionGuard {
    manager: ConnectionManager,
    user_id: i64,
    connection_id: Uuid,
}

impl SubscriptionGuard {
    pub fn new(manager: ConnectionManager, user_id: i64, connection_id: Uuid) -> Self {
        Self {
            manager,
            user_id,
            connection_id,
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.manager.remove_connection(self.user_id, self.connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Notification;
    use chrono::Utc;

    fn message(id: i64) -> HubMessage {
        HubMessage::ReceiveNotification(Notification {
            id,
            user_id: 3,
            message: "Mentor assigned".into(),
            is_read: false,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn test_fan_out_to_every_subscription() {
        let manager = ConnectionManager::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        manager.add_connection(3, tx1);
        manager.add_connection(3, tx2);

        let sent = message(1);
        assert_eq!(manager.send_to_user(3, sent.clone()), 2);
        assert_eq!(rx1.try_recv().unwrap(), sent);
        assert_eq!(rx2.try_recv().unwrap(), sent);
        assert_eq!(manager.send_to_user(4, message(2)), 0);
    }

    #[test]
    fn test_closed_subscriptions_are_pruned() {
        let manager = ConnectionManager::new();
        let (tx, rx) = mpsc::unbounded_channel();
        manager.add_connection(3, tx);
        drop(rx);

        assert_eq!(manager.send_to_user(3, message(1)), 0);
        assert!(!manager.is_user_online(3));
    }

    #[test]
    fn test_guard_removes_subscription() {
        let manager = ConnectionManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = manager.add_connection(9, tx);
        assert_eq!(manager.online_count(), 1);

        drop(SubscriptionGuard::new(manager.clone(), 9, id));
        assert_eq!(manager.online_count(), 0);
    }
}
