use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use super::Toast;
use crate::notification::Notification;

/// The one notification cache both the push channel and the poller write to.
///
/// An id is toasted only the first time it is inserted, so the same
/// notification arriving by push and then by poll shows once.
#[derive(Clone, Default)]
pub struct NotificationFeed {
    entries: Arc<DashMap<i64, Notification>>,
    seeded: Arc<AtomicBool>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads what the user already has without toasting any of it.
    pub fn seed(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            self.entries.insert(notification.id, notification);
        }
        self.seeded.store(true, Ordering::SeqCst);
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded.load(Ordering::SeqCst)
    }

    /// Stores a notification, returning a toast if its id was unseen.
    pub fn ingest(&self, notification: Notification) -> Option<Toast> {
        match self.entries.entry(notification.id) {
            dashmap::mapref::entry::Entry::Occupied(mut existing) => {
                // Keep a local read mark if the incoming copy predates it.
                let was_read = existing.get().is_read;
                let entry = existing.get_mut();
                *entry = notification;
                entry.is_read |= was_read;
                None
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let toast = Toast::info(notification.message.clone());
                slot.insert(notification);
                Some(toast)
            }
        }
    }

    /// Merges a full fetch. The first one seeds silently.
    pub fn reconcile(&self, notifications: Vec<Notification>) -> Vec<Toast> {
        if !self.is_seeded() {
            self.seed(notifications);
            return Vec::new();
        }
        notifications
            .into_iter()
            .filter_map(|notification| self.ingest(notification))
            .collect()
    }

    pub fn mark_read(&self, id: i64) -> bool {
        match self.entries.get_mut(&id) {
            Some(mut entry) => {
                entry.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_read).count()
    }

    /// Newest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        let mut notifications: Vec<Notification> =
            self.entries.iter().map(|entry| entry.value().clone()).collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        notifications
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
