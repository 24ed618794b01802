//! Status command - checks the chat backend's health endpoint.

use super::connect;
use crate::config::WidgetConfig;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub async fn execute(mut config: WidgetConfig, api_url: Option<String>) -> Result<()> {
    let client = connect(&mut config, api_url)?;
    let color = atty::is(atty::Stream::Stdout);

    let health = client
        .health()
        .await
        .with_context(|| format!("Backend at {} is unreachable", client.base_url()))?;

    println!("Backend: {}", client.base_url());
    let status = if !color {
        health.status.clone()
    } else if health.is_healthy() {
        health.status.green().to_string()
    } else {
        health.status.red().to_string()
    };
    println!("Status:  {}", status);
    if let Some(message) = &health.message {
        println!("Message: {}", message);
    }

    if !health.is_healthy() {
        anyhow::bail!("Backend reports status \"{}\"", health.status);
    }
    Ok(())
}
