use crate::error::Result;
use sqlx::{PgPool, Postgres, Transaction};
use super::mentorship_models::{MentoringRequest, MentorshipStatus};

#[derive(Clone)]
pub struct MentorshipRepository {
    pool: PgPool,
}

impl MentorshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a `Pending` request, copying the alumni's display name.
    /// `None` when the alumni does not exist.
    pub async fn create(&self, alumni_id: i64, message: &str) -> Result<Option<MentoringRequest>> {
        let request = sqlx::query_as::<_, MentoringRequest>(
            "INSERT INTO mentorships (alumni_id, alumni_name, message)
             SELECT id, username, $2 FROM users WHERE id = $1
             RETURNING *"
        )
        .bind(alumni_id)
        .bind(message)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<MentoringRequest>> {
        let request = sqlx::query_as::<_, MentoringRequest>("SELECT * FROM mentorships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    pub async fn find_page(
        &self,
        alumni_id: Option<i64>,
        status: Option<MentorshipStatus>,
        limit: u32,
        offset: i64,
    ) -> Result<(Vec<MentoringRequest>, i64)> {
        let mut conditions = Vec::new();
        let mut params_count = 0;

        if alumni_id.is_some() {
            params_count += 1;
            conditions.push(format!("alumni_id = ${}", params_count));
        }
        if status.is_some() {
            params_count += 1;
            conditions.push(format!("status = ${}", params_count));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM mentorships{}", where_clause);
        let page_sql = format!(
            "SELECT * FROM mentorships{} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            params_count + 1,
            params_count + 2
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut page_query = sqlx::query_as::<_, MentoringRequest>(&page_sql);

        if let Some(alumni_id) = alumni_id {
            count_query = count_query.bind(alumni_id);
            page_query = page_query.bind(alumni_id);
        }
        if let Some(status) = status {
            count_query = count_query.bind(status);
            page_query = page_query.bind(status);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let requests = page_query
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((requests, total))
    }

    /// Row-locks the request for the rest of the transaction.
    pub async fn lock_with_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> Result<Option<MentoringRequest>> {
        let request = sqlx::query_as::<_, MentoringRequest>(
            "SELECT * FROM mentorships WHERE id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(request)
    }

    pub async fn set_status_with_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        status: MentorshipStatus,
    ) -> Result<MentoringRequest> {
        let request = sqlx::query_as::<_, MentoringRequest>(
            "UPDATE mentorships SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING *"
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(request)
    }

    /// Cancels only while still `Pending` and owned by `alumni_id`.
    pub async fn cancel_pending(&self, id: i64, alumni_id: i64) -> Result<Option<MentoringRequest>> {
        let request = sqlx::query_as::<_, MentoringRequest>(
            "UPDATE mentorships SET status = 'Cancelled', updated_at = NOW()
             WHERE id = $1 AND alumni_id = $2 AND status = 'Pending'
             RETURNING *"
        )
        .bind(id)
        .bind(alumni_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }
}
