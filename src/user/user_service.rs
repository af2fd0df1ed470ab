use crate::{
    error::{AppError, Result},
    user::{user_models::UserResponse, user_repository::UserRepository},
};

#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    pub async fn get_current_user(&self, user_id: i64) -> Result<UserResponse> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    pub async fn list_mentors(&self) -> Result<Vec<UserResponse>> {
        let mentors = self.user_repository.find_mentors().await?;
        Ok(mentors.into_iter().map(UserResponse::from).collect())
    }
}
