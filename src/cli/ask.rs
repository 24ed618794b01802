//! Ask command - runs a single send cycle without the interactive session.

use super::connect;
use crate::config::WidgetConfig;
use crate::transcript::{ControllerOptions, SendOutcome, TranscriptController};
use anyhow::Result;

/// Send `message` once and print the assistant turn in `format`
/// (`text`, `html` or `json`).
pub async fn execute(
    mut config: WidgetConfig,
    message: &str,
    api_url: Option<String>,
    format: &str,
) -> Result<()> {
    if !matches!(format, "text" | "html" | "json") {
        anyhow::bail!("Unknown output format: {} (expected text, html or json)", format);
    }

    let client = connect(&mut config, api_url)?;
    let mut controller = TranscriptController::new(ControllerOptions {
        welcome_message: None,
        ..ControllerOptions::from_config(&config)
    });

    let outcome = controller.send(&client, message).await;
    if outcome == SendOutcome::Rejected {
        anyhow::bail!("Message is empty");
    }

    let Some(reply) = controller.messages().last() else {
        anyhow::bail!("No reply was recorded");
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(reply)?),
        "html" => println!("{}", reply.rendered_markup.as_deref().unwrap_or_default()),
        _ => println!("{}", reply.raw_text),
    }

    if outcome == SendOutcome::Failed {
        anyhow::bail!("Chat request to {} failed", client.base_url());
    }
    Ok(())
}
