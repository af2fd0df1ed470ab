use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::schedule::Schedule;
use crate::timestamp::rfc3339_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text")]
pub enum MentorshipStatus {
    Pending,
    Active,
    Cancelled,
    Completed,
}

impl std::fmt::Display for MentorshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MentorshipStatus::Pending => write!(f, "Pending"),
            MentorshipStatus::Active => write!(f, "Active"),
            MentorshipStatus::Cancelled => write!(f, "Cancelled"),
            MentorshipStatus::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentoringRequest {
    pub id: i64,
    pub alumni_id: i64,
    pub alumni_name: String,
    pub message: String,
    pub status: MentorshipStatus,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

/// A request together with the schedule created when it was triaged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipDetail {
    pub request: MentoringRequest,
    pub schedule: Option<Schedule>,
}
