//! Markdown export of a transcript.

use super::{Sender, TranscriptController};

/// Options for formatting transcripts
pub struct TranscriptOptions {
    pub include_welcome: bool,
}

impl Default for TranscriptOptions {
    fn default() -> Self {
        Self {
            include_welcome: true,
        }
    }
}

/// Format the conversation as a markdown transcript. Turns are written with
/// their raw text, not the rendered markup.
pub fn format_transcript(
    title: &str,
    controller: &TranscriptController,
    options: &TranscriptOptions,
) -> String {
    let mut output = String::new();

    // Header
    output.push_str(&format!("# {}\n\n", title));
    output.push_str(&format!("Session ID: `{}`\n", controller.session_id()));
    output.push_str(&format!(
        "Exported: {}\n\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str("---\n\n");

    let skip = usize::from(!options.include_welcome && controller.welcome().is_some());

    for msg in controller.messages().iter().skip(skip) {
        let heading = match msg.sender {
            Sender::User => "User",
            Sender::Assistant => "Assistant",
        };
        output.push_str(&format!("## {}\n\n", heading));
        output.push_str(msg.raw_text.trim_end());
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::ControllerOptions;

    fn sample() -> TranscriptController {
        let mut controller = TranscriptController::new(ControllerOptions {
            welcome_message: Some("Welcome!".to_string()),
            ..Default::default()
        });
        controller.append_user("What are rates like?");
        controller.append_assistant("Rates are **low**.");
        controller
    }

    #[test]
    fn test_format_transcript() {
        let controller = sample();
        let output = format_transcript("Mortgage chat", &controller, &TranscriptOptions::default());

        assert!(output.starts_with("# Mortgage chat\n\n"));
        assert!(output.contains(&format!("Session ID: `{}`", controller.session_id())));
        assert!(output.contains("## Assistant\n\nWelcome!\n\n"));
        assert!(output.contains("## User\n\nWhat are rates like?\n\n"));
        assert!(output.ends_with("## Assistant\n\nRates are **low**.\n\n"));
    }

    #[test]
    fn test_format_transcript_without_welcome() {
        let controller = sample();
        let options = TranscriptOptions {
            include_welcome: false,
        };
        let output = format_transcript("Mortgage chat", &controller, &options);

        assert!(!output.contains("Welcome!"));
        assert_eq!(output.matches("## Assistant").count(), 1);
        assert_eq!(output.matches("## User").count(), 1);
    }

    #[test]
    fn test_without_welcome_keeps_first_turn_when_none_configured() {
        let mut controller = TranscriptController::new(ControllerOptions::default());
        controller.append_user("hi");
        let options = TranscriptOptions {
            include_welcome: false,
        };
        let output = format_transcript("t", &controller, &options);
        assert!(output.contains("## User\n\nhi\n\n"));
    }
}
