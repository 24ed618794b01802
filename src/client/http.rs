//! HTTP implementation of the chat backend.
//!
//! `POST {api_url}/chat` with `{"message": ...}`; any 2xx whose JSON body has
//! an `answer` string is a success. Everything else is a [`SendError`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatBackend, SendError};
use crate::config::WidgetConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Only `answer` is read; the endpoint may send more (e.g. `sources`).
#[derive(Debug, Deserialize)]
struct ChatReply {
    answer: String,
}

/// Body of `GET {api_url}/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Chat client for the widget's backend.
pub struct HttpChatClient {
    client: Client,
    base_url: String,
}

impl HttpChatClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SendError> {
        Self::with_timeout(base_url, None)
    }

    /// Build a client whose requests give up after `timeout`. Without one a
    /// request may wait indefinitely.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SendError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SendError::InvalidUrl(base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(SendError::Transport)?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, SendError> {
        Self::with_timeout(
            config.api_url(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Query the backend's health endpoint.
    ///
    /// An unhealthy backend answers 503 with a JSON body; that body is still
    /// returned as a status rather than an error.
    pub async fn health(&self) -> Result<HealthStatus, SendError> {
        let url = self.endpoint("health");
        tracing::debug!(url = %url, "Checking backend health");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(SendError::Transport)?;
        let code = response.status();
        let body = response.text().await.map_err(SendError::Transport)?;

        match serde_json::from_str::<HealthStatus>(&body) {
            Ok(status) => Ok(status),
            Err(_) if !code.is_success() => Err(SendError::Status(code.as_u16())),
            Err(e) => Err(SendError::Malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    async fn send(&self, message: &str) -> Result<String, SendError> {
        let url = self.endpoint("chat");
        tracing::debug!(url = %url, chars = message.chars().count(), "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(SendError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(SendError::Transport)?;
        let reply: ChatReply =
            serde_json::from_str(&body).map_err(|e| SendError::Malformed(e.to_string()))?;

        tracing::debug!(chars = reply.answer.chars().count(), "Received chat answer");
        Ok(reply.answer)
    }
}
