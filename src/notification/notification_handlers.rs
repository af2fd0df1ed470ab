use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};

use crate::{
    error::Result,
    hub::connection::SubscriptionGuard,
    middleware::AuthUser,
    response::ApiResponse,
    state::AppState,
};
use super::notification_models::Notification;

/// Get all notifications for a user
#[utoipa::path(
    get,
    path = "/api/Notification/user/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Notifications, newest first", body = Vec<Notification>),
        (status = 403, description = "Not the caller's notifications")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn get_user_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Notification>>>> {
    let notifications = state
        .notification_service
        .list_for_user(user, user_id)
        .await?;

    Ok(Json(ApiResponse::success("Notifications retrieved", notifications)))
}

/// Mark notification as read
#[utoipa::path(
    patch,
    path = "/api/Notification/mark-as-read/{id}",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<ApiResponse<Notification>>> {
    let notification = state
        .notification_service
        .mark_as_read(user, notification_id)
        .await?;

    Ok(Json(ApiResponse::success("Notification marked as read", notification)))
}

/// Push channel: `ReceiveNotification` events as Server-Sent Events
#[utoipa::path(
    get,
    path = "/notificationHub",
    params(("access_token" = Option<String>, Query, description = "Bearer token for clients that cannot set headers")),
    responses(
        (status = 200, description = "Event stream established"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn notification_hub(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.hub_connections.add_connection(user.id, tx);
    let guard = SubscriptionGuard::new(state.hub_connections.clone(), user.id, connection_id);

    let stream = UnboundedReceiverStream::new(rx).filter_map(move |message| {
        let _subscription = &guard;
        match message.payload_json() {
            Ok(data) => Some(Ok(Event::default().event(message.event_name()).data(data))),
            Err(e) => {
                tracing::error!("Failed to encode hub message: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
