use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::{not_blank, PaginationParams};
use super::mentorship_models::MentorshipStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMentorshipRequest {
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MentorshipFilters {
    pub status: Option<MentorshipStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl MentorshipFilters {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_message_rejected() {
        let request = CreateMentorshipRequest { message: "   ".into() };
        assert!(request.validate().is_err());

        let request = CreateMentorshipRequest { message: "Help with interviews".into() };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_oversized_message_rejected() {
        let request = CreateMentorshipRequest { message: "x".repeat(2001) };
        assert!(request.validate().is_err());
    }
}
