use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::dto::not_blank;
use crate::timestamp::rfc3339_millis;
use super::schedule_models::ScheduleStatus;

/// Mentor assignment for a pending request. `status`, `rating` and
/// `comment` travel with the body but only their initial values are legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_assignment", skip_on_field_errors = false))]
pub struct AcceptScheduleRequest {
    #[serde(rename = "mentorShipId")]
    pub mentorship_id: i64,
    #[validate(range(min = 1))]
    pub mentor_id: i64,
    #[serde(with = "rfc3339_millis")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub end_time: DateTime<Utc>,
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub content: String,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub rating: Option<i16>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn validate_assignment(request: &AcceptScheduleRequest) -> Result<(), ValidationError> {
    if request.end_time <= request.start_time {
        return Err(schema_error("time_window", "End time must be after start time"));
    }
    if matches!(request.status, Some(status) if status != ScheduleStatus::Active) {
        return Err(schema_error("initial_status", "A new schedule must be Active"));
    }
    if request.rating.is_some() || request.comment.is_some() {
        return Err(schema_error("premature_rating", "A new schedule cannot carry a rating"));
    }
    Ok(())
}

fn schema_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteScheduleRequest {
    pub schedule_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailScheduleRequest {
    pub schedule_id: i64,
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateScheduleRequest {
    pub schedule_id: i64,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFilters {
    pub status: Option<ScheduleStatus>,
}
