use crate::{
    auth::{create_access_token, hash_password, verify_password},
    error::{AppError, Result},
    user::{user_repository::UserRepository, User, UserRole},
};

#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    jwt_secret: String,
    expiration_hours: i64,
}

impl AuthService {
    pub fn new(user_repository: UserRepository, jwt_secret: String, expiration_hours: i64) -> Self {
        Self {
            user_repository,
            jwt_secret,
            expiration_hours,
        }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<(User, String)> {
        if role == UserRole::Admin {
            return Err(AppError::Forbidden("Admin accounts cannot self-register".to_string()));
        }

        if self.user_repository.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_repository
            .create(username, email, &password_hash, role)
            .await?;
        let token = self.issue_token(&user)?;

        tracing::info!(user_id = user.id, role = %user.role, "registered user");
        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        create_access_token(
            user.id,
            &user.email,
            user.role,
            &self.jwt_secret,
            self.expiration_hours,
        )
    }
}
