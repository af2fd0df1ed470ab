use crate::{
    db::DbPool,
    error::{AppError, Result},
    mentorship::{MentorshipRepository, MentorshipStatus},
    middleware::AuthUser,
    notification::NotificationService,
    timestamp,
    user::{UserRepository, UserRole},
};
use super::{
    schedule_dto::{AcceptScheduleRequest, FailScheduleRequest, RateScheduleRequest, ScheduleFilters},
    schedule_models::{Schedule, ScheduleStatus},
    schedule_repository::ScheduleRepository,
};

/// Mentor assignment and the session lifecycle that follows it.
///
/// Every transition is a conditional update on the current status, so two
/// racing requests can never both win; the loser gets `409 Conflict`.
#[derive(Clone)]
pub struct ScheduleService {
    db: DbPool,
    mentorships: MentorshipRepository,
    schedules: ScheduleRepository,
    users: UserRepository,
    notifications: NotificationService,
}

impl ScheduleService {
    pub fn new(
        db: DbPool,
        mentorships: MentorshipRepository,
        schedules: ScheduleRepository,
        users: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db,
            mentorships,
            schedules,
            users,
            notifications,
        }
    }

    pub async fn accept(&self, actor: AuthUser, payload: AcceptScheduleRequest) -> Result<Schedule> {
        actor.require_staff()?;

        let mut tx = self.db.begin().await?;

        let request = self
            .mentorships
            .lock_with_tx(&mut tx, payload.mentorship_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentoring request not found".to_string()))?;

        if request.status != MentorshipStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Mentoring request is already {}",
                request.status
            )));
        }

        let mentor = self
            .users
            .lock_with_tx(&mut tx, payload.mentor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentor not found".to_string()))?;

        if mentor.role != UserRole::Mentor {
            return Err(AppError::BadRequest("Selected user is not a mentor".to_string()));
        }

        if self
            .schedules
            .mentor_has_overlap_with_tx(&mut tx, mentor.id, payload.start_time, payload.end_time)
            .await?
        {
            return Err(AppError::Conflict(
                "Mentor is already booked for an overlapping session".to_string(),
            ));
        }

        let schedule = self
            .schedules
            .create_with_tx(&mut tx, &request, &mentor, &payload)
            .await?;
        self.mentorships
            .set_status_with_tx(&mut tx, request.id, MentorshipStatus::Active)
            .await?;

        tx.commit().await?;

        tracing::info!(
            schedule_id = schedule.id,
            mentorship_id = request.id,
            mentor_id = mentor.id,
            "mentor assigned"
        );

        self.notify(
            schedule.alumni_id,
            format!(
                "{} accepted your mentoring request. Session starts {}.",
                schedule.mentor_name,
                timestamp::format(&schedule.start_time)
            ),
        )
        .await;
        self.notify(
            schedule.mentor_id,
            format!(
                "You have a new mentoring session with {} at {}.",
                schedule.alumni_name,
                timestamp::format(&schedule.start_time)
            ),
        )
        .await;

        Ok(schedule)
    }

    pub async fn complete(&self, actor: AuthUser, schedule_id: i64) -> Result<Schedule> {
        let schedule = self
            .finish(actor, schedule_id, ScheduleStatus::Completed, None)
            .await?;

        self.notify(
            schedule.alumni_id,
            format!(
                "Your session \"{}\" with {} is complete. You can now rate it.",
                schedule.content, schedule.mentor_name
            ),
        )
        .await;

        Ok(schedule)
    }

    pub async fn fail(&self, actor: AuthUser, payload: FailScheduleRequest) -> Result<Schedule> {
        let reason = payload.reason.trim();
        let schedule = self
            .finish(actor, payload.schedule_id, ScheduleStatus::Failed, Some(reason))
            .await?;

        self.notify(
            schedule.alumni_id,
            format!(
                "Your session \"{}\" with {} did not take place: {}",
                schedule.content, schedule.mentor_name, reason
            ),
        )
        .await;

        Ok(schedule)
    }

    pub async fn rate(&self, actor: AuthUser, payload: RateScheduleRequest) -> Result<Schedule> {
        let current = self.find_visible(actor, payload.schedule_id).await?;
        if current.alumni_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the mentored alumni can rate this session".to_string(),
            ));
        }

        if !current.can_be_rated() {
            return Err(rating_conflict(&current));
        }

        let comment = payload
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let schedule = match self
            .schedules
            .rate(payload.schedule_id, actor.id, payload.rating, comment)
            .await?
        {
            Some(schedule) => schedule,
            None => {
                let latest = self
                    .schedules
                    .find_by_id(payload.schedule_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;
                return Err(rating_conflict(&latest));
            }
        };

        tracing::info!(schedule_id = schedule.id, rating = payload.rating, "session rated");

        self.notify(
            schedule.mentor_id,
            format!(
                "{} rated your session \"{}\" {}/5.",
                schedule.alumni_name, schedule.content, payload.rating
            ),
        )
        .await;

        Ok(schedule)
    }

    pub async fn list(&self, actor: AuthUser, filters: ScheduleFilters) -> Result<Vec<Schedule>> {
        let participant = if actor.is_admin() { None } else { Some(actor.id) };
        self.schedules.find_all(participant, filters.status).await
    }

    pub async fn get(&self, actor: AuthUser, schedule_id: i64) -> Result<Schedule> {
        self.find_visible(actor, schedule_id).await
    }

    async fn find_visible(&self, actor: AuthUser, schedule_id: i64) -> Result<Schedule> {
        let schedule = self
            .schedules
            .find_by_id(schedule_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

        if !actor.is_admin() && !schedule.is_participant(actor.id) {
            return Err(AppError::Forbidden("Not your session".to_string()));
        }

        Ok(schedule)
    }

    async fn finish(
        &self,
        actor: AuthUser,
        schedule_id: i64,
        status: ScheduleStatus,
        failure_reason: Option<&str>,
    ) -> Result<Schedule> {
        let current = self.find_visible(actor, schedule_id).await?;
        if !actor.is_admin() && current.mentor_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the assigned mentor can close this session".to_string(),
            ));
        }

        if !current.status.can_transition_to(status) {
            return Err(AppError::Conflict(format!("Schedule is already {}", current.status)));
        }

        let mut tx = self.db.begin().await?;

        let schedule = match self
            .schedules
            .finish_with_tx(&mut tx, schedule_id, status, failure_reason)
            .await?
        {
            Some(schedule) => schedule,
            None => {
                let latest = self
                    .schedules
                    .find_by_id(schedule_id)
                    .await?
                    .map(|s| s.status)
                    .unwrap_or(current.status);
                return Err(AppError::Conflict(format!("Schedule is already {}", latest)));
            }
        };

        let request_status = match status {
            ScheduleStatus::Completed => MentorshipStatus::Completed,
            _ => MentorshipStatus::Cancelled,
        };
        self.mentorships
            .set_status_with_tx(&mut tx, schedule.mentorship_id, request_status)
            .await?;

        tx.commit().await?;

        tracing::info!(schedule_id, status = %status, "session closed");
        Ok(schedule)
    }

    /// Delivery failures are logged; the transition has already committed.
    async fn notify(&self, user_id: i64, message: String) {
        if let Err(e) = self.notifications.notify(user_id, &message).await {
            tracing::error!(user_id, "Failed to deliver notification: {:?}", e);
        }
    }
}

fn rating_conflict(schedule: &Schedule) -> AppError {
    if schedule.status != ScheduleStatus::Completed {
        AppError::Conflict("Only completed sessions can be rated".to_string())
    } else {
        AppError::Conflict("Session has already been rated".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mentorship::MentorshipDetail,
        state::tests::{actor, assignment, seed_request, seed_schedule, seed_user, state_with_pool},
        state::AppState,
        user::User,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use sqlx::PgPool;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, hour, 0, 0).unwrap()
    }

    async fn cast(pool: &PgPool) -> (User, User, User) {
        (
            seed_user(pool, "grace", UserRole::Alumni).await,
            seed_user(pool, "alan", UserRole::Mentor).await,
            seed_user(pool, "root", UserRole::Admin).await,
        )
    }

    async fn request_status(state: &AppState, admin: &User, id: i64) -> MentorshipStatus {
        let detail: MentorshipDetail = state.mentorship_service.get(actor(admin), id).await.unwrap();
        detail.request.status
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_accept_activates_request_and_notifies_both(pool: PgPool) {
        let (alumni, mentor, admin) = cast(&pool).await;
        let state = state_with_pool(pool);

        let schedule = seed_schedule(&state, &alumni, &mentor, at(9), at(10)).await;

        assert_eq!(schedule.status, ScheduleStatus::Active);
        assert_eq!(schedule.mentor_name, "alan");
        assert_eq!(schedule.alumni_id, alumni.id);
        assert_eq!(
            request_status(&state, &admin, schedule.mentorship_id).await,
            MentorshipStatus::Active
        );
        for user in [&alumni, &mentor] {
            let inbox = state
                .notification_service
                .list_for_user(actor(user), user.id)
                .await
                .unwrap();
            assert_eq!(inbox.len(), 1);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_only_pending_request_can_be_assigned(pool: PgPool) {
        let (alumni, mentor, _) = cast(&pool).await;
        let state = state_with_pool(pool);
        let schedule = seed_schedule(&state, &alumni, &mentor, at(9), at(10)).await;

        let again = state
            .schedule_service
            .accept(actor(&mentor), assignment(schedule.mentorship_id, mentor.id, at(12), at(13)))
            .await;

        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_mentor_cannot_be_double_booked(pool: PgPool) {
        let (alumni, mentor, _) = cast(&pool).await;
        let state = state_with_pool(pool);
        seed_schedule(&state, &alumni, &mentor, at(9), at(10)).await;

        let second = seed_request(&state, &alumni).await;
        let overlapping = state
            .schedule_service
            .accept(actor(&mentor), assignment(second.id, mentor.id, at(9) + Duration::minutes(30), at(11)))
            .await;
        assert!(matches!(overlapping, Err(AppError::Conflict(_))));

        let back_to_back = state
            .schedule_service
            .accept(actor(&mentor), assignment(second.id, mentor.id, at(10), at(11)))
            .await;
        assert!(back_to_back.is_ok());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_assignee_must_be_a_mentor(pool: PgPool) {
        let (alumni, mentor, admin) = cast(&pool).await;
        let state = state_with_pool(pool);
        let request = seed_request(&state, &alumni).await;

        let result = state
            .schedule_service
            .accept(actor(&mentor), assignment(request.id, admin.id, at(9), at(10)))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_complete_closes_request_and_blocks_fail(pool: PgPool) {
        let (alumni, mentor, admin) = cast(&pool).await;
        let state = state_with_pool(pool);
        let schedule = seed_schedule(&state, &alumni, &mentor, at(9), at(10)).await;

        let completed = state.schedule_service.complete(actor(&mentor), schedule.id).await.unwrap();
        assert_eq!(completed.status, ScheduleStatus::Completed);
        assert_eq!(
            request_status(&state, &admin, schedule.mentorship_id).await,
            MentorshipStatus::Completed
        );

        let late_fail = state
            .schedule_service
            .fail(
                actor(&mentor),
                FailScheduleRequest { schedule_id: schedule.id, reason: "no-show".into() },
            )
            .await;
        match late_fail {
            Err(AppError::Conflict(message)) => assert_eq!(message, "Schedule is already Completed"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_fail_cancels_request(pool: PgPool) {
        let (alumni, mentor, admin) = cast(&pool).await;
        let state = state_with_pool(pool);
        let schedule = seed_schedule(&state, &alumni, &mentor, at(9), at(10)).await;

        let failed = state
            .schedule_service
            .fail(
                actor(&admin),
                FailScheduleRequest { schedule_id: schedule.id, reason: " mentor ill ".into() },
            )
            .await
            .unwrap();

        assert_eq!(failed.status, ScheduleStatus::Failed);
        assert_eq!(failed.failure_reason.as_deref(), Some("mentor ill"));
        assert_eq!(
            request_status(&state, &admin, schedule.mentorship_id).await,
            MentorshipStatus::Cancelled
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_racing_complete_and_fail_have_one_winner(pool: PgPool) {
        let (alumni, mentor, _) = cast(&pool).await;
        let state = state_with_pool(pool);
        let schedule = seed_schedule(&state, &alumni, &mentor, at(9), at(10)).await;

        let (completed, failed) = tokio::join!(
            state.schedule_service.complete(actor(&mentor), schedule.id),
            state.schedule_service.fail(
                actor(&mentor),
                FailScheduleRequest { schedule_id: schedule.id, reason: "no-show".into() },
            ),
        );

        let winners = [completed.is_ok(), failed.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(winners, 1);
        let loser = completed.err().or(failed.err());
        assert!(matches!(loser, Some(AppError::Conflict(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_other_mentor_cannot_close_session(pool: PgPool) {
        let (alumni, mentor, _) = cast(&pool).await;
        let other = seed_user(&pool, "barbara", UserRole::Mentor).await;
        let state = state_with_pool(pool);
        let schedule = seed_schedule(&state, &alumni, &mentor, at(9), at(10)).await;

        let result = state.schedule_service.complete(actor(&other), schedule.id).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_rating_only_once_and_only_when_completed(pool: PgPool) {
        let (alumni, mentor, _) = cast(&pool).await;
        let state = state_with_pool(pool);
        let schedule = seed_schedule(&state, &alumni, &mentor, at(9), at(10)).await;
        let rate = |rating| RateScheduleRequest {
            schedule_id: schedule.id,
            rating,
            comment: Some("Very helpful".into()),
        };

        match state.schedule_service.rate(actor(&alumni), rate(5)).await {
            Err(AppError::Conflict(message)) => {
                assert_eq!(message, "Only completed sessions can be rated")
            }
            other => panic!("expected conflict, got {:?}", other),
        }

        state.schedule_service.complete(actor(&mentor), schedule.id).await.unwrap();

        let mentor_rating = state.schedule_service.rate(actor(&mentor), rate(5)).await;
        assert!(matches!(mentor_rating, Err(AppError::Forbidden(_))));

        let rated = state.schedule_service.rate(actor(&alumni), rate(4)).await.unwrap();
        assert_eq!(rated.rating, Some(4));
        assert_eq!(rated.comment.as_deref(), Some("Very helpful"));

        match state.schedule_service.rate(actor(&alumni), rate(2)).await {
            Err(AppError::Conflict(message)) => assert_eq!(message, "Session has already been rated"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }
}
