use axum::{extract::State, Json};

use crate::{
    error::Result,
    middleware::AuthUser,
    response::ApiResponse,
    state::AppState,
    user::user_models::UserResponse,
};

/// Get current user profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "User profile retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let profile = state.user_service.get_current_user(user.id).await?;

    Ok(Json(ApiResponse::success("User retrieved", profile)))
}

/// List mentors available for assignment
#[utoipa::path(
    get,
    path = "/api/users/mentors",
    tag = "users",
    responses(
        (status = 200, description = "Mentors retrieved successfully", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_mentors(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>> {
    let mentors = state.user_service.list_mentors().await?;

    Ok(Json(ApiResponse::success("Mentors retrieved", mentors)))
}
