use super::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::{
    error::Result,
    response::ApiResponse,
    state::AppState,
    user::UserRole,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let role = payload.role.unwrap_or(UserRole::Alumni);
    let (user, access_token) = state
        .auth_service
        .register(&payload.username, &payload.email, &payload.password, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Registration successful",
            AuthResponse {
                access_token,
                user: user.into(),
            },
        )),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    payload.validate()?;

    let (user, access_token) = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(
        "Login successful",
        AuthResponse {
            access_token,
            user: user.into(),
        },
    )))
}
