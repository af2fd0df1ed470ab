use anyhow::Context;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST root, e.g. `https://alumni.example.edu/api`.
    pub api_base_url: String,
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let base = std::env::var("API_BASE_URL")
            .or_else(|_| std::env::var("NEXT_PUBLIC_API_BASE_URL"))
            .context("API_BASE_URL or NEXT_PUBLIC_API_BASE_URL must be set")?;
        Ok(Self::new(base))
    }

    /// The push channel lives beside the REST root, not under it.
    pub fn hub_url(&self) -> String {
        let root = self
            .api_base_url
            .strip_suffix("/api")
            .unwrap_or(&self.api_base_url);
        format!("{}/notificationHub", root)
    }
}
