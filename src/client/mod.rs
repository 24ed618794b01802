//! Chat endpoint client.
//!
//! The transcript controller only knows the [`ChatBackend`] trait; the HTTP
//! implementation lives in [`http`].

mod http;

pub use http::{HealthStatus, HttpChatClient};

use async_trait::async_trait;
use thiserror::Error;

/// Why a send failed. The transcript collapses all of these into one
/// fallback turn; the detail only goes to the log.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("chat endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Malformed(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

/// The request/response exchange with the remote chat endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and return the assistant's answer verbatim.
    async fn send(&self, message: &str) -> Result<String, SendError>;
}
