//! Config management CLI commands.

use crate::config::WidgetConfig;
use anyhow::Result;

/// Show current configuration
pub async fn show() -> Result<()> {
    let config = WidgetConfig::load().await?;

    println!("{}", serde_json::to_string_pretty(&config)?);
    println!();
    println!("Effective endpoint: {}", config.api_url());

    Ok(())
}

/// Show configuration file paths
pub async fn path() -> Result<()> {
    if let Some(global_path) = WidgetConfig::global_config_path() {
        let marker = if global_path.exists() { "" } else { " (not created)" };
        println!("Global config: {}{}", global_path.display(), marker);
    }

    let cwd = std::env::current_dir()?;
    match WidgetConfig::find_project_config(&cwd) {
        Some(project_path) => println!("Project config: {}", project_path.display()),
        None => println!("No project config found from {}", cwd.display()),
    }

    Ok(())
}

/// Initialize configuration file with defaults
pub async fn init() -> Result<()> {
    let config_path = WidgetConfig::init().await?;
    println!(
        "Configuration file at: {}",
        config_path.display()
    );
    println!("\nPoint \"api_url\" at your chat backend, or set CHAT_WIDGET_API_URL.");
    Ok(())
}
