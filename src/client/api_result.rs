use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::error::ClientError;
use crate::response::ResponseStatus;

/// A response envelope, classified once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult<T> {
    Success { message: String, data: T },
    PartialSuccess { message: String, data: Option<T> },
    Failure { message: String },
}

#[derive(Deserialize)]
struct RawEnvelope {
    status: ResponseStatus,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl<T: DeserializeOwned> ApiResult<T> {
    pub fn from_value(body: Value) -> Result<Self, ClientError> {
        let envelope: RawEnvelope = serde_json::from_value(body)?;

        Ok(match envelope.status {
            ResponseStatus::Success => {
                let data = serde_json::from_value(envelope.data.unwrap_or(Value::Null))?;
                ApiResult::Success {
                    message: envelope.message,
                    data,
                }
            }
            ResponseStatus::PartialSuccess => {
                let data = match envelope.data {
                    Some(Value::Null) | None => None,
                    Some(value) => Some(serde_json::from_value(value)?),
                };
                ApiResult::PartialSuccess {
                    message: envelope.message,
                    data,
                }
            }
            ResponseStatus::Error => ApiResult::Failure {
                message: envelope.message,
            },
        })
    }
}

impl<T> ApiResult<T> {
    pub fn message(&self) -> &str {
        match self {
            ApiResult::Success { message, .. }
            | ApiResult::PartialSuccess { message, .. }
            | ApiResult::Failure { message } => message,
        }
    }

    /// Collapses to the data, treating a partial success without data as an
    /// error.
    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            ApiResult::Success { data, .. } => Ok(data),
            ApiResult::PartialSuccess { data: Some(data), message } => {
                tracing::warn!("Partial success: {}", message);
                Ok(data)
            }
            ApiResult::PartialSuccess { data: None, message } | ApiResult::Failure { message } => {
                Err(ClientError::Api(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_parses_data() {
        let result: ApiResult<Vec<i64>> =
            ApiResult::from_value(json!({"status": "success", "message": "ok", "data": [1, 2]}))
                .unwrap();
        assert_eq!(
            result,
            ApiResult::Success { message: "ok".into(), data: vec![1, 2] }
        );
    }

    #[test]
    fn test_unit_success_without_data() {
        let result: ApiResult<()> =
            ApiResult::from_value(json!({"status": "success", "message": "done"})).unwrap();
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_error_becomes_failure() {
        let result: ApiResult<i64> = ApiResult::from_value(
            json!({"status": "error", "message": "Schedule is already Completed"}),
        )
        .unwrap();
        assert_eq!(result.message(), "Schedule is already Completed");

        match result.into_result() {
            Err(ClientError::Api(message)) => assert_eq!(message, "Schedule is already Completed"),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_success() {
        let result: ApiResult<i64> = ApiResult::from_value(
            json!({"status": "partial_success", "message": "some failed", "data": 3}),
        )
        .unwrap();
        assert_eq!(result.into_result().unwrap(), 3);

        let result: ApiResult<i64> = ApiResult::from_value(
            json!({"status": "partial_success", "message": "nothing", "data": null}),
        )
        .unwrap();
        assert!(matches!(result.into_result(), Err(ClientError::Api(_))));
    }

    #[test]
    fn test_unknown_status_is_decode_error() {
        let result = ApiResult::<i64>::from_value(json!({"status": "maybe", "message": ""}));
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }
}
