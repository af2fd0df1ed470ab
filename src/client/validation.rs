//! Input checks that run before anything is sent.
//!
//! Drafts carry their own `validator` rules for what a form can leave
//! empty; once complete they are turned into the request DTOs and checked
//! again against the exact rules the server enforces.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

use crate::dto::not_blank;
use crate::schedule::{AcceptScheduleRequest, FailScheduleRequest, RateScheduleRequest, ScheduleStatus};

/// Inline message for `field`, or for a whole-form error under `__all__`.
pub fn field_message(errors: &ValidationErrors, field: &str) -> Option<String> {
    errors
        .field_errors()
        .get(field)
        .and_then(|list| list.first())
        .map(|error| {
            error
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| error.code.to_string())
        })
}

/// Every field with its first message, in field order.
pub fn inline_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .keys()
        .filter_map(|field| {
            let field = field.to_string();
            field_message(errors, &field).map(|message| (field, message))
        })
        .collect()
}

/// Mentor assignment as entered, before it is known to be valid.
#[derive(Debug, Clone, Default, Validate)]
pub struct AssignmentDraft {
    pub mentorship_id: i64,
    #[validate(required(message = "Please select a mentor"), range(min = 1))]
    pub mentor_id: Option<i64>,
    #[validate(required(message = "Start time is required"))]
    pub start_time: Option<DateTime<Utc>>,
    #[validate(required(message = "End time is required"))]
    pub end_time: Option<DateTime<Utc>>,
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub content: String,
}

impl AssignmentDraft {
    pub fn to_request(&self) -> Result<AcceptScheduleRequest, ValidationErrors> {
        Validate::validate(self)?;

        let (Some(mentor_id), Some(start_time), Some(end_time)) =
            (self.mentor_id, self.start_time, self.end_time)
        else {
            return Err(ValidationErrors::new());
        };

        let request = AcceptScheduleRequest {
            mentorship_id: self.mentorship_id,
            mentor_id,
            start_time,
            end_time,
            content: self.content.trim().to_string(),
            status: Some(ScheduleStatus::Active),
            rating: None,
            comment: None,
        };
        request.validate()?;
        Ok(request)
    }
}

pub fn failure_request(schedule_id: i64, reason: &str) -> Result<FailScheduleRequest, ValidationErrors> {
    let request = FailScheduleRequest {
        schedule_id,
        reason: reason.trim().to_string(),
    };
    request.validate()?;
    Ok(request)
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RatingDraft {
    pub schedule_id: i64,
    /// Zero means no star chosen yet.
    #[validate(range(min = 1, max = 5, message = "Please choose between 1 and 5 stars"))]
    pub rating: u8,
    pub comment: String,
}

impl RatingDraft {
    pub fn to_request(&self) -> Result<RateScheduleRequest, ValidationErrors> {
        Validate::validate(self)?;

        let comment = self.comment.trim();
        let request = RateScheduleRequest {
            schedule_id: self.schedule_id,
            rating: i16::from(self.rating),
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        };
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2025, 1, 10, hour, 0, 0).unwrap())
    }

    fn draft() -> AssignmentDraft {
        AssignmentDraft {
            mentorship_id: 7,
            mentor_id: Some(42),
            start_time: at(9),
            end_time: at(10),
            content: "Resume review".into(),
        }
    }

    #[test]
    fn test_valid_draft_builds_request() {
        let request = draft().to_request().unwrap();
        assert_eq!(request.mentorship_id, 7);
        assert_eq!(request.mentor_id, 42);
        assert_eq!(request.status, Some(ScheduleStatus::Active));
        assert_eq!(request.rating, None);
        assert_eq!(request.comment, None);
    }

    #[test]
    fn test_end_before_or_equal_start_rejected() {
        let mut inverted = draft();
        inverted.end_time = at(8);
        let errors = inverted.to_request().unwrap_err();
        assert_eq!(
            field_message(&errors, "__all__").as_deref(),
            Some("End time must be after start time")
        );

        let mut empty_window = draft();
        empty_window.end_time = at(9);
        assert!(empty_window.to_request().is_err());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let errors = AssignmentDraft {
            mentorship_id: 7,
            content: "  ".into(),
            ..Default::default()
        }
        .to_request()
        .unwrap_err();

        let messages = inline_messages(&errors);
        assert_eq!(messages["mentor_id"], "Please select a mentor");
        assert_eq!(messages["start_time"], "Start time is required");
        assert_eq!(messages["end_time"], "End time is required");
        assert_eq!(messages["content"], "must not be blank");
    }

    #[test]
    fn test_overlong_content_rejected_locally() {
        let mut long = draft();
        long.content = "x".repeat(2001);
        let errors = long.to_request().unwrap_err();
        assert!(field_message(&errors, "content").is_some());
    }

    #[test]
    fn test_failure_reason_required() {
        assert!(failure_request(11, " \n").is_err());
        assert!(failure_request(11, &"x".repeat(2001)).is_err());
        assert_eq!(failure_request(11, " no-show ").unwrap().reason, "no-show");
    }

    #[test]
    fn test_rating_draft() {
        let unrated = RatingDraft { schedule_id: 11, rating: 0, comment: String::new() };
        assert_eq!(
            field_message(&unrated.to_request().unwrap_err(), "rating").as_deref(),
            Some("Please choose between 1 and 5 stars")
        );

        let rated = RatingDraft { schedule_id: 11, rating: 4, comment: "  ".into() };
        let request = rated.to_request().unwrap();
        assert_eq!(request.rating, 4);
        assert_eq!(request.comment, None);

        let rambling = RatingDraft { schedule_id: 11, rating: 4, comment: "x".repeat(2001) };
        assert!(field_message(&rambling.to_request().unwrap_err(), "comment").is_some());
    }
}
