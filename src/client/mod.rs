//! Typed client for the mentoring API.
//!
//! Every response is parsed into an [`ApiResult`] at the boundary, input is
//! validated before any request leaves the process, and notifications from
//! the push channel and the polling fallback meet in one [`NotificationFeed`].

pub mod api;
pub mod api_result;
pub mod center;
pub mod config;
pub mod error;
pub mod feed;
pub mod poller;
pub mod push;
pub mod rating;
pub mod sse;
pub mod transport;
pub mod validation;

pub use api::MentoringClient;
pub use api_result::ApiResult;
pub use center::NotificationCenter;
pub use config::ClientConfig;
pub use error::ClientError;
pub use feed::NotificationFeed;
pub use push::{HubConnector, PushConnectionManager, SseHubConnector};
pub use rating::{RatingControl, StarSelector};
pub use transport::{ApiRequest, HttpTransport, TokenProvider, Transport};
pub use validation::{field_message, inline_messages, AssignmentDraft, RatingDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Error, message: message.into() }
    }
}

/// Cached query families a successful mutation makes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Mentorships,
    Schedules,
    Notifications,
}
