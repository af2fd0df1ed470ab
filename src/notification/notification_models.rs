use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::timestamp::rfc3339_millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub is_read: bool,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}
