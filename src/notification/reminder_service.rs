use crate::{state::AppState, timestamp};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

pub async fn start_reminder_service(
    state: AppState,
) -> Result<JobScheduler, Box<dyn std::error::Error + Send + Sync>> {
    let scheduler = JobScheduler::new().await?;

    // Run every minute to catch sessions entering the reminder window
    let job = Job::new_async("0 * * * * *", move |_uuid, _l| {
        let state = state.clone();

        Box::pin(async move {
            if let Err(e) = send_session_reminders(&state).await {
                error!("Error sending session reminders: {:?}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Session reminder service started");
    Ok(scheduler)
}

/// Claims due sessions, then reminds both parties of each. A failed
/// delivery is logged and never re-sent, and does not stop the rest of the
/// batch.
async fn send_session_reminders(state: &AppState) -> crate::error::Result<usize> {
    let schedules = state
        .schedule_repository
        .claim_due_reminders(state.config.session_reminder_minutes)
        .await?;

    for schedule in &schedules {
        let starts = timestamp::format(&schedule.start_time);
        let reminders = [
            (schedule.alumni_id, &schedule.mentor_name),
            (schedule.mentor_id, &schedule.alumni_name),
        ];

        for (user_id, partner) in reminders {
            let message = format!(
                "Reminder: your session \"{}\" with {} starts at {}.",
                schedule.content, partner, starts
            );
            if let Err(e) = state.notification_service.notify(user_id, &message).await {
                error!(schedule_id = schedule.id, user_id, "Failed to send session reminder: {:?}", e);
            }
        }

        info!(schedule_id = schedule.id, "Sent session reminder");
    }

    Ok(schedules.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::{actor, seed_schedule, seed_user, state_with_pool};
    use crate::user::UserRole;
    use chrono::{Duration, Utc};
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_due_session_reminded_exactly_once(pool: PgPool) {
        let alumni = seed_user(&pool, "grace", UserRole::Alumni).await;
        let mentor = seed_user(&pool, "alan", UserRole::Mentor).await;
        let state = state_with_pool(pool);
        let start = Utc::now() + Duration::minutes(10);
        seed_schedule(&state, &alumni, &mentor, start, start + Duration::hours(1)).await;

        assert_eq!(send_session_reminders(&state).await.unwrap(), 1);
        assert_eq!(send_session_reminders(&state).await.unwrap(), 0);

        for user in [&alumni, &mentor] {
            let inbox = state
                .notification_service
                .list_for_user(actor(user), user.id)
                .await
                .unwrap();
            assert_eq!(inbox.iter().filter(|n| n.message.starts_with("Reminder")).count(), 1);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_distant_session_not_reminded(pool: PgPool) {
        let alumni = seed_user(&pool, "grace", UserRole::Alumni).await;
        let mentor = seed_user(&pool, "alan", UserRole::Mentor).await;
        let state = state_with_pool(pool);
        let start = Utc::now() + Duration::hours(5);
        seed_schedule(&state, &alumni, &mentor, start, start + Duration::hours(1)).await;

        assert_eq!(send_session_reminders(&state).await.unwrap(), 0);
    }
}
