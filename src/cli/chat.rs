//! Chat command - interactive terminal session against the chat backend.
//!
//! Input is read line by line on the main task. A printer task consumes the
//! controller's event stream and writes assistant turns and the typing line,
//! so the terminal always reflects what the transcript holds.

use super::connect;
use crate::config::WidgetConfig;
use crate::transcript::{
    format_transcript, ControllerOptions, Message, SendOutcome, TranscriptController,
    TranscriptEvent, TranscriptOptions,
};
use crate::view;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    QuickReply(usize),
    Export(&'a str),
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Message(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" | "q" => Input::Quit,
        "help" | "?" => Input::Help,
        "export" if !arg.is_empty() => Input::Export(arg),
        _ => match name.parse::<usize>() {
            Ok(n) if n >= 1 && arg.is_empty() => Input::QuickReply(n - 1),
            _ => Input::Unknown(trimmed),
        },
    }
}

#[derive(Debug, Clone, Copy)]
struct Style {
    color: bool,
}

impl Style {
    fn detect() -> Self {
        Self {
            color: atty::is(atty::Stream::Stdout),
        }
    }

    fn assistant_label(&self) -> String {
        if self.color {
            "Assistant".cyan().bold().to_string()
        } else {
            "Assistant".to_string()
        }
    }

    fn prompt(&self) -> String {
        if self.color {
            "> ".green().bold().to_string()
        } else {
            "> ".to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

fn print_prompt(style: Style) {
    print!("{}", style.prompt());
    let _ = std::io::stdout().flush();
}

fn print_assistant(message: &Message, style: Style) {
    println!("{}", style.assistant_label());
    println!("{}", message.raw_text.trim_end());
    println!();
}

fn print_quick_replies(labels: &[String], style: Style) {
    if labels.is_empty() {
        return;
    }
    println!("{}", style.dim("Quick replies:"));
    for (i, label) in labels.iter().enumerate() {
        println!("  {} {}", style.dim(&format!("/{}", i + 1)), label);
    }
    println!();
}

fn print_help(style: Style) {
    println!("{}", style.dim("/1, /2, ...    send a quick reply"));
    println!("{}", style.dim("/export FILE   save the conversation as markdown"));
    println!("{}", style.dim("/quit          leave the session"));
}

/// Consume transcript events until the controller goes away.
async fn print_events(mut events: mpsc::UnboundedReceiver<TranscriptEvent>, style: Style) {
    let show_typing = atty::is(atty::Stream::Stderr);

    while let Some(event) = events.recv().await {
        match event {
            TranscriptEvent::TypingShown if show_typing => {
                eprint!("{}", style.dim("Assistant is typing…"));
                let _ = std::io::stderr().flush();
            }
            TranscriptEvent::TypingHidden if show_typing => {
                eprint!("\r\x1b[2K");
                let _ = std::io::stderr().flush();
            }
            TranscriptEvent::MessageAppended(message) if !message.is_user() => {
                print_assistant(&message, style);
                print_prompt(style);
            }
            _ => {}
        }
    }
}

async fn write_page(path: &Path, title: &str, controller: &TranscriptController) -> Result<()> {
    tokio::fs::write(path, view::render_page(title, controller))
        .await
        .with_context(|| format!("Failed to write {:?}", path))
}

async fn export(path: &str, title: &str, controller: &TranscriptController) -> Result<()> {
    let content = format_transcript(title, controller, &TranscriptOptions::default());
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write transcript to {}", path))
}

/// Run the interactive session until `/quit` or end of input.
pub async fn execute(
    mut config: WidgetConfig,
    api_url: Option<String>,
    html: Option<PathBuf>,
) -> Result<()> {
    let client = connect(&mut config, api_url)?;
    let style = Style::detect();
    let title = config.title().to_string();

    let mut controller = TranscriptController::new(ControllerOptions::from_config(&config));
    tracing::debug!(
        session = controller.session_id(),
        endpoint = client.base_url(),
        "Starting chat session"
    );

    println!("{}", if style.color { title.bold().to_string() } else { title.clone() });
    println!("{}", style.dim(&format!("{} (/help for commands)", config.placeholder())));
    println!();
    for message in controller.messages() {
        print_assistant(message, style);
    }
    print_quick_replies(controller.list_quick_replies(), style);

    if let Some(path) = &html {
        write_page(path, &title, &controller).await?;
    }

    let printer = tokio::spawn(print_events(controller.subscribe(), style));
    print_prompt(style);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let outcome = match parse_input(&line) {
            Input::Quit => break,
            Input::Help => {
                print_help(style);
                None
            }
            Input::Export(path) => {
                match export(path, &title, &controller).await {
                    Ok(()) => println!("{}", style.dim(&format!("Saved transcript to {}", path))),
                    Err(e) => eprintln!("{:#}", e),
                }
                None
            }
            Input::Unknown(command) => {
                eprintln!("Unknown command: {}", command);
                None
            }
            Input::QuickReply(index) => {
                let label = controller.list_quick_replies().get(index).cloned();
                match label {
                    Some(label) => {
                        println!("{}{}", style.prompt(), label);
                        controller.select_quick_reply(&client, index).await
                    }
                    None => {
                        eprintln!("No quick reply /{}", index + 1);
                        None
                    }
                }
            }
            Input::Message(text) => Some(controller.send(&client, text).await),
        };

        if let (Some(SendOutcome::Answered | SendOutcome::Failed), Some(path)) = (outcome, &html) {
            if let Err(e) = write_page(path, &title, &controller).await {
                tracing::warn!("{:#}", e);
            }
        }

        // The printer re-prompts after assistant turns; everything else
        // prompts here.
        if !matches!(outcome, Some(SendOutcome::Answered | SendOutcome::Failed)) {
            print_prompt(style);
        }
    }

    drop(controller);
    let _ = printer.await;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_message() {
        assert_eq!(parse_input("hello there"), Input::Message("hello there"));
        assert_eq!(parse_input("  "), Input::Message("  "));
    }

    #[test]
    fn test_parse_quick_reply() {
        assert_eq!(parse_input("/1"), Input::QuickReply(0));
        assert_eq!(parse_input(" /3 "), Input::QuickReply(2));
        assert_eq!(parse_input("/0"), Input::Unknown("/0"));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/help"), Input::Help);
        assert_eq!(parse_input("/export chat.md"), Input::Export("chat.md"));
        assert_eq!(parse_input("/export"), Input::Unknown("/export"));
        assert_eq!(parse_input("/nope"), Input::Unknown("/nope"));
    }
}
