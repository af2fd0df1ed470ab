use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    dto::PaginatedResponse,
    error::Result,
    middleware::AuthUser,
    response::ApiResponse,
    state::AppState,
};
use super::{
    mentorship_dto::{CreateMentorshipRequest, MentorshipFilters},
    mentorship_models::{MentoringRequest, MentorshipDetail},
};

/// Submit a mentoring request
#[utoipa::path(
    post,
    path = "/api/v1/mentorships",
    tag = "mentorships",
    request_body = CreateMentorshipRequest,
    responses(
        (status = 201, description = "Request created with status Pending", body = MentoringRequest),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Only alumni may submit requests")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_mentorship(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMentorshipRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let request = state.mentorship_service.submit(user, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Mentoring request submitted", request)),
    ))
}

/// List mentoring requests
#[utoipa::path(
    get,
    path = "/api/v1/mentorships",
    tag = "mentorships",
    params(
        ("status" = Option<String>, Query, description = "Pending, Active, Cancelled or Completed"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated mentoring requests"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_mentorships(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filters): Query<MentorshipFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<MentoringRequest>>>> {
    let page = state.mentorship_service.list(user, filters).await?;

    Ok(Json(ApiResponse::success("Mentoring requests retrieved", page)))
}

/// Get a mentoring request and its schedule
#[utoipa::path(
    get,
    path = "/api/v1/mentorships/{id}",
    tag = "mentorships",
    params(("id" = i64, Path, description = "Mentoring request ID")),
    responses(
        (status = 200, description = "Mentoring request", body = MentorshipDetail),
        (status = 403, description = "Not visible to caller"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_mentorship(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MentorshipDetail>>> {
    let detail = state.mentorship_service.get(user, id).await?;

    Ok(Json(ApiResponse::success("Mentoring request retrieved", detail)))
}

/// Cancel a pending mentoring request
#[utoipa::path(
    patch,
    path = "/api/v1/mentorships/{id}/cancel",
    tag = "mentorships",
    params(("id" = i64, Path, description = "Mentoring request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = MentoringRequest),
        (status = 404, description = "Not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_mentorship(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MentoringRequest>>> {
    let request = state.mentorship_service.cancel(user, id).await?;

    Ok(Json(ApiResponse::success("Mentoring request cancelled", request)))
}
