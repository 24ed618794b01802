//! Command implementations for the `chat-widget` binary.

pub mod ask;
pub mod chat;
pub mod config;
pub mod render;
pub mod status;

use crate::client::HttpChatClient;
use crate::config::WidgetConfig;
use anyhow::{Context, Result};

/// Build the HTTP client, letting `--api-url` win over the configured URL.
fn connect(config: &mut WidgetConfig, api_url: Option<String>) -> Result<HttpChatClient> {
    if let Some(url) = api_url {
        config.api_url = Some(url);
    }
    HttpChatClient::from_config(config)
        .with_context(|| format!("Invalid chat endpoint: {}", config.api_url()))
}
