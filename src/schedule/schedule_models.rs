use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::timestamp::rfc3339_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text")]
pub enum ScheduleStatus {
    Active,
    Completed,
    Failed,
}

impl ScheduleStatus {
    /// Sessions leave `Active` exactly once and never come back.
    pub fn can_transition_to(self, next: ScheduleStatus) -> bool {
        matches!(
            (self, next),
            (ScheduleStatus::Active, ScheduleStatus::Completed)
                | (ScheduleStatus::Active, ScheduleStatus::Failed)
        )
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleStatus::Active => write!(f, "Active"),
            ScheduleStatus::Completed => write!(f, "Completed"),
            ScheduleStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,
    #[serde(rename = "mentorShipId")]
    pub mentorship_id: i64,
    pub mentor_id: i64,
    pub mentor_name: String,
    pub alumni_id: i64,
    pub alumni_name: String,
    #[serde(with = "rfc3339_millis")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub end_time: DateTime<Utc>,
    pub content: String,
    pub status: ScheduleStatus,
    pub failure_reason: Option<String>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
    #[serde(skip)]
    pub reminder_sent: bool,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.mentor_id == user_id || self.alumni_id == user_id
    }

    /// Rating opens once, after completion.
    pub fn can_be_rated(&self) -> bool {
        self.status == ScheduleStatus::Completed && self.rating.is_none()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub fn sample_schedule(status: ScheduleStatus, rating: Option<i16>) -> Schedule {
        let start = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        Schedule {
            id: 11,
            mentorship_id: 7,
            mentor_id: 42,
            mentor_name: "Alan".into(),
            alumni_id: 3,
            alumni_name: "Grace".into(),
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            content: "Resume review".into(),
            status,
            failure_reason: None,
            rating,
            comment: None,
            reminder_sent: false,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_schedule_status_display() {
        assert_eq!(ScheduleStatus::Active.to_string(), "Active");
        assert_eq!(ScheduleStatus::Completed.to_string(), "Completed");
        assert_eq!(ScheduleStatus::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_transitions_leave_active_once() {
        use ScheduleStatus::*;
        assert!(Active.can_transition_to(Completed));
        assert!(Active.can_transition_to(Failed));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Active.can_transition_to(Active));
    }

    #[test]
    fn test_rating_window() {
        assert!(!sample_schedule(ScheduleStatus::Active, None).can_be_rated());
        assert!(!sample_schedule(ScheduleStatus::Failed, None).can_be_rated());
        assert!(sample_schedule(ScheduleStatus::Completed, None).can_be_rated());
        assert!(!sample_schedule(ScheduleStatus::Completed, Some(4)).can_be_rated());
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(sample_schedule(ScheduleStatus::Active, None)).unwrap();
        assert_eq!(json["mentorShipId"], 7);
        assert_eq!(json["mentorId"], 42);
        assert_eq!(json["startTime"], "2025-01-10T09:00:00.000Z");
        assert_eq!(json["endTime"], "2025-01-10T10:00:00.000Z");
        assert_eq!(json["status"], "Active");
        assert!(json["rating"].is_null());
        assert!(json.get("reminderSent").is_none());
    }

    #[test]
    fn test_participants() {
        let schedule = sample_schedule(ScheduleStatus::Active, None);
        assert!(schedule.is_participant(42));
        assert!(schedule.is_participant(3));
        assert!(!schedule.is_participant(99));
    }
}
