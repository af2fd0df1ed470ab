use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    error::Result,
    middleware::AuthUser,
    response::ApiResponse,
    state::AppState,
};
use super::{
    schedule_dto::{
        AcceptScheduleRequest, CompleteScheduleRequest, FailScheduleRequest, RateScheduleRequest,
        ScheduleFilters,
    },
    schedule_models::Schedule,
};

/// Assign a mentor and time window to a pending request
#[utoipa::path(
    post,
    path = "/api/schedules/mentorship/accept",
    tag = "schedules",
    request_body = AcceptScheduleRequest,
    responses(
        (status = 201, description = "Schedule created; request is now Active", body = Schedule),
        (status = 400, description = "Invalid assignment"),
        (status = 403, description = "Mentor or admin access required"),
        (status = 404, description = "Request or mentor not found"),
        (status = 409, description = "Request already triaged or mentor double-booked")
    ),
    security(("bearer_auth" = []))
)]
pub async fn accept_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AcceptScheduleRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let schedule = state.schedule_service.accept(user, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Mentor assigned", schedule)),
    ))
}

/// Mark a session completed
#[utoipa::path(
    patch,
    path = "/api/schedules/complete",
    tag = "schedules",
    request_body = CompleteScheduleRequest,
    responses(
        (status = 200, description = "Session completed", body = Schedule),
        (status = 403, description = "Not the assigned mentor"),
        (status = 409, description = "Session already closed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn complete_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CompleteScheduleRequest>,
) -> Result<Json<ApiResponse<Schedule>>> {
    let schedule = state
        .schedule_service
        .complete(user, payload.schedule_id)
        .await?;

    Ok(Json(ApiResponse::success("Session completed", schedule)))
}

/// Mark a session failed with a reason
#[utoipa::path(
    patch,
    path = "/api/schedules/fail",
    tag = "schedules",
    request_body = FailScheduleRequest,
    responses(
        (status = 200, description = "Session failed", body = Schedule),
        (status = 400, description = "Reason missing"),
        (status = 403, description = "Not the assigned mentor"),
        (status = 409, description = "Session already closed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn fail_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<FailScheduleRequest>,
) -> Result<Json<ApiResponse<Schedule>>> {
    payload.validate()?;

    let schedule = state.schedule_service.fail(user, payload).await?;

    Ok(Json(ApiResponse::success("Session marked as failed", schedule)))
}

/// Rate a completed session
#[utoipa::path(
    post,
    path = "/api/v1/api/schedules/rate",
    tag = "schedules",
    request_body = RateScheduleRequest,
    responses(
        (status = 200, description = "Rating recorded", body = Schedule),
        (status = 400, description = "Rating outside 1-5"),
        (status = 403, description = "Not the mentored alumni"),
        (status = 409, description = "Not completed or already rated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn rate_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RateScheduleRequest>,
) -> Result<Json<ApiResponse<Schedule>>> {
    payload.validate()?;

    let schedule = state.schedule_service.rate(user, payload).await?;

    Ok(Json(ApiResponse::success("Thank you for your feedback", schedule)))
}

/// List the caller's sessions
#[utoipa::path(
    get,
    path = "/api/schedules",
    tag = "schedules",
    params(("status" = Option<String>, Query, description = "Active, Completed or Failed")),
    responses(
        (status = 200, description = "Sessions", body = Vec<Schedule>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_schedules(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filters): Query<ScheduleFilters>,
) -> Result<Json<ApiResponse<Vec<Schedule>>>> {
    let schedules = state.schedule_service.list(user, filters).await?;

    Ok(Json(ApiResponse::success("Schedules retrieved", schedules)))
}

/// Get one session
#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    tag = "schedules",
    params(("id" = i64, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Session", body = Schedule),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Schedule>>> {
    let schedule = state.schedule_service.get(user, id).await?;

    Ok(Json(ApiResponse::success("Schedule retrieved", schedule)))
}
