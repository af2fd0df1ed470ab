use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

use super::{config::ClientConfig, error::ClientError};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API root, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Whether the bearer token is attached.
    pub secure: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            secure: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_opt(mut self, key: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn public(mut self) -> Self {
        self.secure = false;
        self
    }
}

/// Sends one request and hands back the raw envelope, whatever the status
/// code.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ClientError>;
}

pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            tokens,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .query(&request.query);

        if request.secure {
            if let Some(token) = self.tokens.token() {
                builder = builder.bearer_auth(token);
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        // Error envelopes arrive with 4xx/5xx codes and are still parsed.
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => Ok(body),
            Err(e) => {
                tracing::warn!(%status, path = %request.path, "Non-JSON response: {:?}", e);
                Err(ClientError::Unexpected(format!("{} from {}", status, request.path)))
            }
        }
    }
}
