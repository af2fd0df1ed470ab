use std::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use super::{api::MentoringClient, feed::NotificationFeed, Toast};

/// Fetches the user's notifications every `period` and merges them into the
/// feed. Failures are logged and the next tick tries again.
pub fn spawn_poller(
    client: MentoringClient,
    feed: NotificationFeed,
    user_id: i64,
    period: Duration,
    toasts: mpsc::UnboundedSender<Toast>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            for toast in poll_once(&client, &feed, user_id).await {
                if toasts.send(toast).is_err() {
                    tracing::debug!("Toast receiver dropped, stopping poller");
                    return;
                }
            }
        }
    })
}

pub async fn poll_once(client: &MentoringClient, feed: &NotificationFeed, user_id: i64) -> Vec<Toast> {
    match client.list_notifications(user_id).await {
        Ok(notifications) => feed.reconcile(notifications),
        Err(e) => {
            tracing::warn!(user_id, "Notification poll failed: {}", e);
            Vec::new()
        }
    }
}
