use crate::error::Result;
use crate::mentorship::MentoringRequest;
use crate::user::User;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use super::{
    schedule_dto::AcceptScheduleRequest,
    schedule_models::{Schedule, ScheduleStatus},
};

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &MentoringRequest,
        mentor: &User,
        payload: &AcceptScheduleRequest,
    ) -> Result<Schedule> {
        let schedule = sqlx::query_as::<_, Schedule>(
            "INSERT INTO schedules
                (mentorship_id, mentor_id, mentor_name, alumni_id, alumni_name,
                 start_time, end_time, content)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *"
        )
        .bind(request.id)
        .bind(mentor.id)
        .bind(&mentor.username)
        .bind(request.alumni_id)
        .bind(&request.alumni_name)
        .bind(payload.start_time)
        .bind(payload.end_time)
        .bind(payload.content.trim())
        .fetch_one(&mut **tx)
        .await?;

        Ok(schedule)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(schedule)
    }

    pub async fn find_by_mentorship(&self, mentorship_id: i64) -> Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE mentorship_id = $1"
        )
        .bind(mentorship_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    /// Schedules where `participant` is mentor or alumni; every schedule when `None`.
    pub async fn find_all(
        &self,
        participant: Option<i64>,
        status: Option<ScheduleStatus>,
    ) -> Result<Vec<Schedule>> {
        let mut query = "SELECT * FROM schedules WHERE TRUE".to_string();
        let mut params_count = 0;

        if participant.is_some() {
            params_count += 1;
            query.push_str(&format!(
                " AND (mentor_id = ${0} OR alumni_id = ${0})",
                params_count
            ));
        }

        if status.is_some() {
            params_count += 1;
            query.push_str(&format!(" AND status = ${}", params_count));
        }

        query.push_str(" ORDER BY start_time DESC");

        let mut db_query = sqlx::query_as::<_, Schedule>(&query);

        if let Some(user_id) = participant {
            db_query = db_query.bind(user_id);
        }

        if let Some(status) = status {
            db_query = db_query.bind(status);
        }

        let schedules = db_query.fetch_all(&self.pool).await?;
        Ok(schedules)
    }

    pub async fn mentor_has_overlap_with_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mentor_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<bool> {
        let overlapping = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM schedules
                WHERE mentor_id = $1
                  AND status = 'Active'
                  AND start_time < $3
                  AND end_time > $2
             )"
        )
        .bind(mentor_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(&mut **tx)
        .await?;

        Ok(overlapping)
    }

    /// Moves an `Active` schedule to a terminal status. `None` when the
    /// schedule is missing or no longer `Active`.
    pub async fn finish_with_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        status: ScheduleStatus,
        failure_reason: Option<&str>,
    ) -> Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>(
            "UPDATE schedules
             SET status = $2, failure_reason = $3, updated_at = NOW()
             WHERE id = $1 AND status = 'Active'
             RETURNING *"
        )
        .bind(id)
        .bind(status)
        .bind(failure_reason)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(schedule)
    }

    /// Records a rating only on a completed, unrated schedule of `alumni_id`.
    pub async fn rate(
        &self,
        id: i64,
        alumni_id: i64,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>(
            "UPDATE schedules
             SET rating = $3, comment = $4, updated_at = NOW()
             WHERE id = $1 AND alumni_id = $2 AND status = 'Completed' AND rating IS NULL
             RETURNING *"
        )
        .bind(id)
        .bind(alumni_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    /// Flags and returns the `Active` sessions starting within
    /// `lead_minutes` that have not been reminded yet. A row is handed out
    /// once, even to concurrent callers.
    pub async fn claim_due_reminders(&self, lead_minutes: i64) -> Result<Vec<Schedule>> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "UPDATE schedules
             SET reminder_sent = TRUE
             WHERE id IN (
                SELECT id FROM schedules
                WHERE status = 'Active'
                  AND reminder_sent = FALSE
                  AND start_time > NOW()
                  AND start_time <= NOW() + ($1 * INTERVAL '1 minute')
                FOR UPDATE SKIP LOCKED
             )
             RETURNING *"
        )
        .bind(lead_minutes as f64)
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules)
    }
}
