use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};

use super::{
    config::ClientConfig,
    error::ClientError,
    sse::SseDecoder,
    transport::TokenProvider,
};
use crate::hub::HubMessage;

pub type HubStream = BoxStream<'static, Result<HubMessage, ClientError>>;

/// Delays before each reconnect attempt once a live stream ends.
pub const RECONNECT_DELAYS: [Duration; 4] = [
    Duration::from_secs(0),
    Duration::from_secs(2),
    Duration::from_secs(5),
    Duration::from_secs(10),
];

#[async_trait]
pub trait HubConnector: Send + Sync {
    async fn open(&self) -> Result<HubStream, ClientError>;
}

/// Opens the server-sent event stream at `/notificationHub`.
pub struct SseHubConnector {
    http: reqwest::Client,
    hub_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SseHubConnector {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            hub_url: config.hub_url(),
            tokens,
        }
    }
}

#[async_trait]
impl HubConnector for SseHubConnector {
    async fn open(&self) -> Result<HubStream, ClientError> {
        let mut request = self
            .http
            .get(&self.hub_url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(token) = self.tokens.token() {
            request = request.query(&[("access_token", token)]);
        }

        let response = request.send().await?.error_for_status()?;

        let messages = response
            .bytes_stream()
            .scan(SseDecoder::new(), |decoder, chunk| {
                let items: Vec<Result<HubMessage, ClientError>> = match chunk {
                    Ok(bytes) => decoder
                        .push(&bytes)
                        .into_iter()
                        .filter_map(|frame| {
                            HubMessage::from_frame(&frame.event, &frame.data)
                                .map_err(ClientError::from)
                                .transpose()
                        })
                        .collect(),
                    Err(e) => vec![Err(ClientError::from(e))],
                };
                futures::future::ready(Some(stream::iter(items)))
            })
            .flatten();

        Ok(messages.boxed())
    }
}

/// Owns the single push connection of a client session.
///
/// `connect` is serialized by an async mutex, so concurrent callers share
/// one underlying connection. Errors are logged and never returned.
pub struct PushConnectionManager {
    connector: Arc<dyn HubConnector>,
    sink: mpsc::UnboundedSender<HubMessage>,
    reconnect_delays: Vec<Duration>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PushConnectionManager {
    pub fn new(connector: Arc<dyn HubConnector>, sink: mpsc::UnboundedSender<HubMessage>) -> Self {
        Self {
            connector,
            sink,
            reconnect_delays: RECONNECT_DELAYS.to_vec(),
            task: Mutex::new(None),
        }
    }

    pub fn with_reconnect_delays(mut self, delays: Vec<Duration>) -> Self {
        self.reconnect_delays = delays;
        self
    }

    pub async fn connect(&self) {
        let mut task = self.task.lock().await;
        if matches!(task.as_ref(), Some(handle) if !handle.is_finished()) {
            tracing::debug!("Notification hub already connected");
            return;
        }

        let initial = match self.connector.open().await {
            Ok(stream) => {
                tracing::info!("Notification hub connected");
                Some(stream)
            }
            Err(e) => {
                tracing::error!("Notification hub connection failed: {}", e);
                None
            }
        };

        *task = Some(tokio::spawn(supervise(
            self.connector.clone(),
            self.sink.clone(),
            self.reconnect_delays.clone(),
            initial,
        )));
    }

    pub async fn disconnect(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            tracing::info!("Notification hub disconnected");
        }
    }

    pub async fn is_connected(&self) -> bool {
        matches!(self.task.lock().await.as_ref(), Some(handle) if !handle.is_finished())
    }
}

impl Drop for PushConnectionManager {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

async fn supervise(
    connector: Arc<dyn HubConnector>,
    sink: mpsc::UnboundedSender<HubMessage>,
    delays: Vec<Duration>,
    mut current: Option<HubStream>,
) {
    loop {
        if let Some(mut stream) = current.take() {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(message) => {
                        if sink.send(message).is_err() {
                            tracing::debug!("Notification sink closed, stopping hub");
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Notification hub stream error: {}", e);
                        break;
                    }
                }
            }
            tracing::info!("Notification hub stream ended");
        }

        current = reconnect(connector.as_ref(), &delays).await;
        if current.is_none() {
            tracing::error!(
                attempts = delays.len(),
                "Notification hub unreachable, giving up"
            );
            return;
        }
    }
}

async fn reconnect(connector: &dyn HubConnector, delays: &[Duration]) -> Option<HubStream> {
    for (attempt, delay) in delays.iter().enumerate() {
        tokio::time::sleep(*delay).await;
        match connector.open().await {
            Ok(stream) => {
                tracing::info!(attempt = attempt + 1, "Notification hub reconnected");
                return Some(stream);
            }
            Err(e) => tracing::warn!(attempt = attempt + 1, "Reconnect failed: {}", e),
        }
    }
    None
}
