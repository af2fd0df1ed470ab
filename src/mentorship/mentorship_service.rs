use crate::{
    dto::PaginatedResponse,
    error::{AppError, Result},
    middleware::AuthUser,
    schedule::schedule_repository::ScheduleRepository,
    user::UserRole,
};
use super::{
    mentorship_dto::{CreateMentorshipRequest, MentorshipFilters},
    mentorship_models::{MentoringRequest, MentorshipDetail},
    mentorship_repository::MentorshipRepository,
};

/// Submission, triage listing and cancellation of mentoring requests.
#[derive(Clone)]
pub struct MentorshipService {
    repo: MentorshipRepository,
    schedule_repo: ScheduleRepository,
}

impl MentorshipService {
    pub fn new(repo: MentorshipRepository, schedule_repo: ScheduleRepository) -> Self {
        Self { repo, schedule_repo }
    }

    pub async fn submit(
        &self,
        actor: AuthUser,
        payload: CreateMentorshipRequest,
    ) -> Result<MentoringRequest> {
        actor.require_role(UserRole::Alumni)?;

        let request = self
            .repo
            .create(actor.id, payload.message.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!(mentorship_id = request.id, alumni_id = actor.id, "mentoring request submitted");
        Ok(request)
    }

    /// Alumni see their own requests; mentors and admins see every request.
    pub async fn list(
        &self,
        actor: AuthUser,
        filters: MentorshipFilters,
    ) -> Result<PaginatedResponse<MentoringRequest>> {
        let (page, limit, offset) = filters.pagination().resolve();
        let owner = if actor.role.is_staff() { None } else { Some(actor.id) };

        let (requests, total) = self
            .repo
            .find_page(owner, filters.status, limit, offset)
            .await?;

        Ok(PaginatedResponse::new(requests, total, page, limit))
    }

    pub async fn get(&self, actor: AuthUser, id: i64) -> Result<MentorshipDetail> {
        let request = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentoring request not found".to_string()))?;

        if !actor.role.is_staff() && request.alumni_id != actor.id {
            return Err(AppError::Forbidden("Not your mentoring request".to_string()));
        }

        let schedule = self.schedule_repo.find_by_mentorship(id).await?;
        Ok(MentorshipDetail { request, schedule })
    }

    pub async fn cancel(&self, actor: AuthUser, id: i64) -> Result<MentoringRequest> {
        if let Some(request) = self.repo.cancel_pending(id, actor.id).await? {
            tracing::info!(mentorship_id = id, "mentoring request cancelled");
            return Ok(request);
        }

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentoring request not found".to_string()))?;

        if current.alumni_id != actor.id {
            return Err(AppError::Forbidden("Not your mentoring request".to_string()));
        }

        Err(AppError::Conflict(format!(
            "Mentoring request is already {}",
            current.status
        )))
    }
}
