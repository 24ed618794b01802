//! Configuration management module.
//!
//! The widget configuration is read from JSON files that may contain comments
//! and trailing commas:
//! - Global config file (~/.config/chat-widget/chat-widget.json)
//! - Project config file (./chat-widget.jsonc or ./chat-widget.json, searched
//!   upward, also inside a `.chat-widget/` directory)
//! - Environment variables
//!
//! Later sources override earlier ones field by field.

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TITLE: &str = "AI Mortgage Assistant";
pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to our mortgage desk! \n\nWhether you're curious about rates, pre-approvals, or first-time buyer programs, I've got you covered. What would you like to know?";
pub const DEFAULT_PLACEHOLDER: &str = "Ask anything about mortgages…";
pub const DEFAULT_FALLBACK_MESSAGE: &str = "I'm having trouble connecting right now. Please try again shortly or reach out directly to our mortgage team.";
pub const DEFAULT_MAX_INPUT_CHARS: usize = 500;
pub const DEFAULT_QUICK_REPLIES: [&str; 3] = [
    "What rate could I qualify for?",
    "How much can I afford?",
    "Explain first-time buyer programs",
];

const CONFIG_FILE_NAMES: [&str; 2] = ["chat-widget.jsonc", "chat-widget.json"];
const PROJECT_DIR_NAME: &str = ".chat-widget";

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("valid trailing comma regex"));

static ENV_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{env:([^}]+)\}").expect("valid env reference regex"));

/// Widget configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct WidgetConfig {
    /// Base URL of the chat backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Panel title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// First assistant turn of every session; empty disables it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,

    /// Input placeholder text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Preset prompts shown until the first message is sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<String>>,

    /// Assistant turn shown when a request fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_message: Option<String>,

    /// Longest accepted user message, in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_input_chars: Option<usize>,

    /// Per-request timeout for the chat endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Log level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl WidgetConfig {
    /// Load configuration from all sources
    pub async fn load() -> Result<Self> {
        let mut config = WidgetConfig::default();

        if let Some(global_path) = Self::global_config_path() {
            if let Some(global_config) = Self::load_file(&global_path).await? {
                config = config.merge(global_config);
            }
        }

        let cwd = std::env::current_dir()?;
        if let Some(project_path) = Self::find_project_config(&cwd) {
            tracing::debug!("Using project config {:?}", project_path);
            if let Some(project_config) = Self::load_file(&project_path).await? {
                config = config.merge(project_config);
            }
        }

        Ok(config.apply_env_overrides())
    }

    /// Get the global config directory path
    pub fn global_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chat-widget"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|p| p.join("chat-widget.json"))
    }

    /// Find the nearest project config, starting at `start` and walking up.
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start.ancestors().find_map(|dir| {
            let candidates = CONFIG_FILE_NAMES
                .iter()
                .map(|name| dir.join(name))
                .chain(
                    CONFIG_FILE_NAMES
                        .iter()
                        .map(|name| dir.join(PROJECT_DIR_NAME).join(name)),
                );
            candidates.into_iter().find(|path| path.is_file())
        })
    }

    /// Load configuration from a file
    pub async fn load_file(path: &Path) -> Result<Option<WidgetConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
            .map(Some)
    }

    /// Parse JSON-with-comments config content
    pub fn parse(content: &str) -> Result<WidgetConfig> {
        if content.trim().is_empty() {
            return Ok(WidgetConfig::default());
        }

        let content = strip_comments(content);
        let content = TRAILING_COMMA.replace_all(&content, "$1");
        let content = substitute_env_vars(&content);

        Ok(serde_json::from_str(&content)?)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(self, other: WidgetConfig) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            title: other.title.or(self.title),
            welcome_message: other.welcome_message.or(self.welcome_message),
            placeholder: other.placeholder.or(self.placeholder),
            quick_replies: other.quick_replies.or(self.quick_replies),
            fallback_message: other.fallback_message.or(self.fallback_message),
            max_input_chars: other.max_input_chars.or(self.max_input_chars),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            log_level: other.log_level.or(self.log_level),
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CHAT_WIDGET_API_URL") {
            self.api_url = Some(url);
        }
        if let Ok(level) = std::env::var("CHAT_WIDGET_LOG_LEVEL") {
            self.log_level = Some(level);
        }
        self
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn welcome_message(&self) -> &str {
        self.welcome_message
            .as_deref()
            .unwrap_or(DEFAULT_WELCOME_MESSAGE)
    }

    pub fn placeholder(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(DEFAULT_PLACEHOLDER)
    }

    pub fn quick_replies(&self) -> Vec<String> {
        match &self.quick_replies {
            Some(labels) => labels.clone(),
            None => DEFAULT_QUICK_REPLIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn fallback_message(&self) -> &str {
        self.fallback_message
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_MESSAGE)
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars.unwrap_or(DEFAULT_MAX_INPUT_CHARS)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Create a default config file if it doesn't exist
    pub async fn init() -> Result<PathBuf> {
        let config_dir = Self::global_config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        fs::create_dir_all(&config_dir)
            .await
            .context("Failed to create config directory")?;

        let config_path = config_dir.join("chat-widget.json");

        if !config_path.exists() {
            let default_config = WidgetConfig {
                api_url: Some(DEFAULT_API_URL.to_string()),
                title: Some(DEFAULT_TITLE.to_string()),
                welcome_message: Some(DEFAULT_WELCOME_MESSAGE.to_string()),
                placeholder: Some(DEFAULT_PLACEHOLDER.to_string()),
                quick_replies: Some(DEFAULT_QUICK_REPLIES.iter().map(|s| s.to_string()).collect()),
                fallback_message: Some(DEFAULT_FALLBACK_MESSAGE.to_string()),
                max_input_chars: Some(DEFAULT_MAX_INPUT_CHARS),
                request_timeout_secs: None,
                log_level: Some("info".to_string()),
            };

            let content = serde_json::to_string_pretty(&default_config)?;
            fs::write(&config_path, content)
                .await
                .context("Failed to write default config file")?;
        }

        Ok(config_path)
    }
}

/// Remove `//` and `/* */` comments outside of string literals.
fn strip_comments(content: &str) -> String {
    #[derive(Clone, Copy)]
    enum State {
        Code,
        Str,
        StrEscape,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(content.len());
    let mut state = State::Code;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        state = match state {
            State::Code => match (c, next) {
                ('/', Some('/')) => {
                    chars.next();
                    State::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    State::BlockComment
                }
                ('"', _) => {
                    out.push(c);
                    State::Str
                }
                _ => {
                    out.push(c);
                    State::Code
                }
            },
            State::Str => {
                out.push(c);
                match c {
                    '\\' => State::StrEscape,
                    '"' => State::Code,
                    _ => State::Str,
                }
            }
            State::StrEscape => {
                out.push(c);
                State::Str
            }
            State::LineComment => {
                if c == '\n' {
                    out.push(c);
                    State::Code
                } else {
                    State::LineComment
                }
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    chars.next();
                    State::Code
                } else {
                    State::BlockComment
                }
            }
        };
    }

    out
}

/// Substitute environment variables written as `{env:VAR_NAME}`
fn substitute_env_vars(content: &str) -> String {
    ENV_REFERENCE
        .replace_all(content, |caps: &Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
