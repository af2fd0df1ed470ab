use crate::{auth::verify_jwt, error::AppError, state::AppState, user::UserRole};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

/// Caller identity resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Mentor or admin access required".to_string()))
        }
    }

    pub fn require_role(&self, role: UserRole) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("{} access required", role)))
        }
    }
}

/// Token from `Authorization: Bearer`, or from `access_token` in the query
/// string for event-stream clients that cannot set headers.
fn extract_token(req: &Request<Body>) -> Option<String> {
    if let Some(header) = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        return header.strip_prefix("Bearer ").map(str::to_string);
    }

    let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(req.uri()).ok()?;
    params.remove("access_token").filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&req)
        .ok_or(AppError::Unauthorized("Invalid credentials".to_string()))?;

    let claims = verify_jwt(&token, &state.config.jwt_secret)?;
    let user = AuthUser {
        id: claims.user_id()?,
        role: claims.role,
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::Unauthorized("Invalid credentials".to_string()))
    }
}
