use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use validator::Validate;

use super::{
    api_result::ApiResult,
    error::ClientError,
    transport::{ApiRequest, Transport},
    validation::{self, AssignmentDraft, RatingDraft},
    QueryKey,
};
use crate::{
    auth::{AuthResponse, LoginRequest},
    dto::PaginatedResponse,
    mentorship::{CreateMentorshipRequest, MentoringRequest, MentorshipDetail, MentorshipStatus},
    notification::Notification,
    schedule::{CompleteScheduleRequest, Schedule, ScheduleStatus},
    user::UserResponse,
};

/// Mentoring lifecycle calls. Mutations validate locally first, send exactly
/// one request, and announce which cached lists went stale.
#[derive(Clone)]
pub struct MentoringClient {
    transport: Arc<dyn Transport>,
    invalidations: broadcast::Sender<QueryKey>,
}

impl MentoringClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (invalidations, _) = broadcast::channel(64);
        Self {
            transport,
            invalidations,
        }
    }

    pub fn subscribe_invalidations(&self) -> broadcast::Receiver<QueryKey> {
        self.invalidations.subscribe()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.call(ApiRequest::post("/auth/login").public().json(to_body(&body)?))
            .await
    }

    pub async fn current_user(&self) -> Result<UserResponse, ClientError> {
        self.call(ApiRequest::get("/users/me")).await
    }

    pub async fn list_mentors(&self) -> Result<Vec<UserResponse>, ClientError> {
        self.call(ApiRequest::get("/users/mentors")).await
    }

    pub async fn submit_request(&self, message: &str) -> Result<MentoringRequest, ClientError> {
        let body = CreateMentorshipRequest {
            message: message.trim().to_string(),
        };
        body.validate()?;

        let request = self
            .call(ApiRequest::post("/v1/mentorships").json(to_body(&body)?))
            .await?;
        self.invalidate(&[QueryKey::Mentorships]);
        Ok(request)
    }

    pub async fn list_requests(
        &self,
        status: Option<MentorshipStatus>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<PaginatedResponse<MentoringRequest>, ClientError> {
        self.call(
            ApiRequest::get("/v1/mentorships")
                .query_opt("status", status)
                .query_opt("page", page)
                .query_opt("limit", limit),
        )
        .await
    }

    pub async fn get_request(&self, id: i64) -> Result<MentorshipDetail, ClientError> {
        self.call(ApiRequest::get(format!("/v1/mentorships/{}", id)))
            .await
    }

    pub async fn cancel_request(&self, id: i64) -> Result<MentoringRequest, ClientError> {
        let request = self
            .call(ApiRequest::patch(format!("/v1/mentorships/{}/cancel", id)))
            .await?;
        self.invalidate(&[QueryKey::Mentorships]);
        Ok(request)
    }

    /// Assigns a mentor. An invalid draft never reaches the network.
    pub async fn accept_schedule(&self, draft: &AssignmentDraft) -> Result<Schedule, ClientError> {
        let body = draft.to_request()?;
        let schedule = self
            .call(ApiRequest::post("/schedules/mentorship/accept").json(to_body(&body)?))
            .await?;
        self.invalidate(&[QueryKey::Mentorships, QueryKey::Schedules]);
        Ok(schedule)
    }

    pub async fn complete_schedule(&self, schedule_id: i64) -> Result<Schedule, ClientError> {
        let body = CompleteScheduleRequest { schedule_id };
        let schedule = self
            .call(ApiRequest::patch("/schedules/complete").json(to_body(&body)?))
            .await?;
        self.invalidate(&[QueryKey::Mentorships, QueryKey::Schedules]);
        Ok(schedule)
    }

    pub async fn fail_schedule(&self, schedule_id: i64, reason: &str) -> Result<Schedule, ClientError> {
        let body = validation::failure_request(schedule_id, reason)?;
        let schedule = self
            .call(ApiRequest::patch("/schedules/fail").json(to_body(&body)?))
            .await?;
        self.invalidate(&[QueryKey::Mentorships, QueryKey::Schedules]);
        Ok(schedule)
    }

    pub async fn rate_schedule(&self, draft: &RatingDraft) -> Result<Schedule, ClientError> {
        let body = draft.to_request()?;
        let schedule = self
            .call(ApiRequest::post("/v1/api/schedules/rate").json(to_body(&body)?))
            .await?;
        self.invalidate(&[QueryKey::Schedules]);
        Ok(schedule)
    }

    pub async fn list_schedules(
        &self,
        status: Option<ScheduleStatus>,
    ) -> Result<Vec<Schedule>, ClientError> {
        self.call(ApiRequest::get("/schedules").query_opt("status", status))
            .await
    }

    pub async fn get_schedule(&self, id: i64) -> Result<Schedule, ClientError> {
        self.call(ApiRequest::get(format!("/schedules/{}", id))).await
    }

    pub async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>, ClientError> {
        self.call(ApiRequest::get(format!("/Notification/user/{}", user_id)))
            .await
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<Notification, ClientError> {
        let notification = self
            .call(ApiRequest::patch(format!("/Notification/mark-as-read/{}", id)))
            .await?;
        self.invalidate(&[QueryKey::Notifications]);
        Ok(notification)
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let path = request.path.clone();
        let body = self.transport.execute(request).await?;
        let result = ApiResult::<T>::from_value(body)?;
        if let ApiResult::Failure { message } = &result {
            tracing::debug!(%path, "Request failed: {}", message);
        }
        result.into_result()
    }

    fn invalidate(&self, keys: &[QueryKey]) {
        for key in keys {
            // No subscribers is fine.
            let _ = self.invalidations.send(*key);
        }
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<Value, ClientError> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        rating::RatingControl,
        testing::{schedule, success, MockTransport},
    };
    use chrono::{TimeZone, Utc};
    use reqwest::Method;
    use serde_json::json;

    fn client(transport: &Arc<MockTransport>) -> MentoringClient {
        MentoringClient::new(transport.clone())
    }

    fn draft(start_hour: u32, end_hour: u32) -> AssignmentDraft {
        AssignmentDraft {
            mentorship_id: 7,
            mentor_id: Some(42),
            start_time: Some(Utc.with_ymd_and_hms(2025, 1, 10, start_hour, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2025, 1, 10, end_hour, 0, 0).unwrap()),
            content: "Resume review".into(),
        }
    }

    fn drain(rx: &mut broadcast::Receiver<QueryKey>) -> Vec<QueryKey> {
        let mut keys = Vec::new();
        while let Ok(key) = rx.try_recv() {
            keys.push(key);
        }
        keys
    }

    #[tokio::test]
    async fn test_invalid_window_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let client = client(&transport);
        let mut invalidations = client.subscribe_invalidations();

        let result = client.accept_schedule(&draft(10, 9)).await;

        match result {
            Err(ClientError::Validation(errors)) => {
                assert!(validation::field_message(&errors, "__all__").is_some())
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(transport.calls().is_empty());
        assert!(drain(&mut invalidations).is_empty());
    }

    #[tokio::test]
    async fn test_overlong_content_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let client = client(&transport);
        let mut long = draft(9, 10);
        long.content = "x".repeat(2001);

        let result = client.accept_schedule(&long).await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_request_message_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let client = client(&transport);

        let error = client.submit_request("   ").await.unwrap_err();

        assert!(error.toast().is_none());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_assignment_makes_one_call() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(success(schedule("Active", None)));
        let client = client(&transport);
        let mut invalidations = client.subscribe_invalidations();

        let created = client.accept_schedule(&draft(9, 10)).await.unwrap();
        assert_eq!(created.mentor_id, 42);

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, "/schedules/mentorship/accept");
        assert_eq!(
            calls[0].body,
            Some(json!({
                "mentorShipId": 7,
                "mentorId": 42,
                "startTime": "2025-01-10T09:00:00.000Z",
                "endTime": "2025-01-10T10:00:00.000Z",
                "content": "Resume review",
                "status": "Active",
                "rating": null,
                "comment": null
            }))
        );
        assert_eq!(
            drain(&mut invalidations),
            vec![QueryKey::Mentorships, QueryKey::Schedules]
        );
    }

    #[tokio::test]
    async fn test_server_error_surfaces_message_without_invalidating() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(json!({"status": "error", "message": "Schedule is already Completed"}));
        let client = client(&transport);
        let mut invalidations = client.subscribe_invalidations();

        let error = client.complete_schedule(11).await.unwrap_err();

        assert_eq!(error.toast().unwrap().message, "Schedule is already Completed");
        assert!(drain(&mut invalidations).is_empty());
    }

    #[tokio::test]
    async fn test_rating_flow_ends_read_only() {
        let transport = Arc::new(MockTransport::new());
        transport
            .respond(success(schedule("Completed", None)))
            .respond(success(schedule("Completed", Some(5))))
            .respond(success(schedule("Completed", Some(5))));
        let client = client(&transport);
        let mut invalidations = client.subscribe_invalidations();

        let before = client.get_schedule(11).await.unwrap();
        assert_eq!(RatingControl::for_schedule(&before), RatingControl::Editable);

        client
            .rate_schedule(&RatingDraft { schedule_id: 11, rating: 5, comment: "Great".into() })
            .await
            .unwrap();
        assert_eq!(drain(&mut invalidations), vec![QueryKey::Schedules]);

        let after = client.get_schedule(11).await.unwrap();
        assert_eq!(RatingControl::for_schedule(&after), RatingControl::ReadOnly(5));

        let calls = transport.calls();
        assert_eq!(calls[1].path, "/v1/api/schedules/rate");
        assert_eq!(
            calls[1].body,
            Some(json!({"scheduleId": 11, "rating": 5, "comment": "Great"}))
        );
    }

    #[tokio::test]
    async fn test_unrated_submission_blocked() {
        let transport = Arc::new(MockTransport::new());
        let client = client(&transport);

        let result = client
            .rate_schedule(&RatingDraft { schedule_id: 11, rating: 0, comment: String::new() })
            .await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fail_requires_reason_locally() {
        let transport = Arc::new(MockTransport::new());
        let client = client(&transport);

        assert!(client.fail_schedule(11, "  ").await.is_err());
        assert!(transport.calls().is_empty());

        transport.respond(success(schedule("Failed", None)));
        client.fail_schedule(11, "Mentor unavailable").await.unwrap();
        assert_eq!(
            transport.calls()[0].body,
            Some(json!({"scheduleId": 11, "reason": "Mentor unavailable"}))
        );
    }

    #[tokio::test]
    async fn test_list_requests_query() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(success(
            json!({"items": [], "total": 0, "page": 2, "limit": 10, "totalPages": 0}),
        ));
        let client = client(&transport);

        let page = client
            .list_requests(Some(MentorshipStatus::Pending), Some(2), None)
            .await
            .unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(
            transport.calls()[0].query,
            vec![
                ("status".to_string(), "Pending".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }
}
