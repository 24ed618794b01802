use anyhow::Result;
use chat_widget::cli;
use chat_widget::config::WidgetConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chat-widget")]
#[command(about = "Assistant chat panel for the terminal and the browser", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Chat backend base URL
        #[arg(long, env = "CHAT_WIDGET_API_URL")]
        api_url: Option<String>,

        /// Keep an HTML rendering of the panel up to date in this file
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,

        /// Chat backend base URL
        #[arg(long, env = "CHAT_WIDGET_API_URL")]
        api_url: Option<String>,

        /// Output format (text, html, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Render markdown-lite text to HTML
    Render {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Wrap the output in a standalone HTML page
        #[arg(long)]
        page: bool,

        /// Write the page to a temp file and open it in the browser
        #[arg(long)]
        open: bool,
    },

    /// Check the chat backend's health
    Status {
        /// Chat backend base URL
        #[arg(long, env = "CHAT_WIDGET_API_URL")]
        api_url: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file paths
    Path,
    /// Initialize configuration file with defaults
    Init,
}

/// Whether `command` needs the merged config. `version` and the `config`
/// commands run without it, so a broken config file can still be located,
/// reinitialized or shown with its parse error.
fn loads_config(command: Option<&Commands>) -> bool {
    !matches!(command, Some(Commands::Version | Commands::Config { .. }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if loads_config(cli.command.as_ref()) {
        WidgetConfig::load().await?
    } else {
        WidgetConfig::default()
    };

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(config.log_level()).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Chat { api_url, html }) => {
            cli::chat::execute(config, api_url, html).await?;
        }
        Some(Commands::Ask {
            message,
            api_url,
            format,
        }) => {
            cli::ask::execute(config, &message, api_url, &format).await?;
        }
        Some(Commands::Render { file, page, open }) => {
            cli::render::execute(&config, file.as_deref(), page, open).await?;
        }
        Some(Commands::Status { api_url }) => {
            cli::status::execute(config, api_url).await?;
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                cli::config::show().await?;
            }
            ConfigCommands::Path => {
                cli::config::path().await?;
            }
            ConfigCommands::Init => {
                cli::config::init().await?;
            }
        },
        Some(Commands::Version) => {
            println!("chat-widget {}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            // Default: interactive session
            cli::chat::execute(config, None, None).await?;
        }
    }

    Ok(())
}
