use thiserror::Error;
use validator::ValidationErrors;

use super::Toast;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Input rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// The server answered with `status: "error"`.
    #[error("{0}")]
    Api(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl ClientError {
    /// Validation errors render inline, not as toasts.
    pub fn toast(&self) -> Option<Toast> {
        match self {
            ClientError::Validation(_) => None,
            ClientError::Api(message) => Some(Toast::error(message.clone())),
            _ => Some(Toast::error("Something went wrong. Please try again.")),
        }
    }
}
