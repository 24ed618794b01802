//! Transcript controller.
//!
//! Owns the ordered message log of one chat panel together with its UI
//! lifecycle: the typing marker and the one-shot quick replies. Every
//! mutation is also published as a [`TranscriptEvent`] so a presentation
//! layer can materialize the transcript without reaching into it.
//!
//! A send cycle always runs `append_user` → `show_typing` → await the backend
//! → `hide_typing` → assistant or fallback turn. `send` holds `&mut self`
//! across the await, so one controller cannot run two cycles at once. There
//! is no timeout here: a backend that never answers leaves the marker up.

mod export;
mod types;

pub use export::{format_transcript, TranscriptOptions};
pub use types::*;

use tokio::sync::mpsc;

use crate::client::ChatBackend;
use crate::config::WidgetConfig;
use crate::id::{self, IdPrefix};
use crate::render;

/// Per-instance settings of a controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Assistant turn appended on creation; `None` or empty skips it.
    pub welcome_message: Option<String>,
    pub quick_replies: Vec<String>,
    pub fallback_message: String,
    /// Longer user input is truncated; 0 disables the limit.
    pub max_input_chars: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            welcome_message: None,
            quick_replies: Vec::new(),
            fallback_message: crate::config::DEFAULT_FALLBACK_MESSAGE.to_string(),
            max_input_chars: crate::config::DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            welcome_message: Some(config.welcome_message().to_string()),
            quick_replies: config.quick_replies(),
            fallback_message: config.fallback_message().to_string(),
            max_input_chars: config.max_input_chars(),
        }
    }
}

pub struct TranscriptController {
    session_id: String,
    messages: Vec<Message>,
    typing: bool,
    quick_replies: QuickReplies,
    next_ordinal: u64,
    fallback_message: String,
    max_input_chars: usize,
    has_welcome: bool,
    events: Option<mpsc::UnboundedSender<TranscriptEvent>>,
}

impl TranscriptController {
    pub fn new(options: ControllerOptions) -> Self {
        let mut controller = Self {
            session_id: id::ascending(IdPrefix::Session),
            messages: Vec::new(),
            typing: false,
            quick_replies: QuickReplies::Visible(options.quick_replies),
            next_ordinal: 0,
            fallback_message: options.fallback_message,
            max_input_chars: options.max_input_chars,
            has_welcome: false,
            events: None,
        };

        if let Some(welcome) = options.welcome_message.filter(|w| !w.trim().is_empty()) {
            controller.append_assistant(&welcome);
            controller.has_welcome = true;
        }

        controller
    }

    /// Receive every mutation from now on. Replaces an earlier subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TranscriptEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The greeting appended on creation, if one was configured.
    pub fn welcome(&self) -> Option<&Message> {
        if self.has_welcome {
            self.messages.first()
        } else {
            None
        }
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Messages in display order, followed by the typing marker if shown.
    pub fn entries(&self) -> Vec<TranscriptEntry<'_>> {
        let mut entries: Vec<_> = self.messages.iter().map(TranscriptEntry::Message).collect();
        if self.typing {
            entries.push(TranscriptEntry::Typing);
        }
        entries
    }

    /// The configured quick replies until the first user message, then
    /// nothing for the rest of the session.
    pub fn list_quick_replies(&self) -> &[String] {
        self.quick_replies.labels()
    }

    /// Append a user turn. Blank input is ignored and returns `None`.
    ///
    /// The text is trimmed and kept verbatim otherwise; it is never rendered.
    /// The first accepted call hides the quick replies for good.
    pub fn append_user(&mut self, text: &str) -> Option<&Message> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::debug!("Ignoring blank user input");
            return None;
        }

        let text = truncate_chars(trimmed, self.max_input_chars);
        if text.len() < trimmed.len() {
            tracing::debug!(limit = self.max_input_chars, "Truncated user input");
        }

        if self.quick_replies.hide() {
            self.emit(TranscriptEvent::QuickRepliesHidden);
        }

        Some(self.push(Sender::User, text.to_string(), None))
    }

    /// Append an assistant turn rendered from markdown-lite text.
    pub fn append_assistant(&mut self, text: &str) -> &Message {
        let markup = render::render(text);
        self.push(Sender::Assistant, text.to_string(), Some(markup))
    }

    /// Append the fixed fallback turn. It is trusted text, so it is escaped
    /// into a paragraph instead of going through the renderer.
    pub fn append_fallback(&mut self) -> &Message {
        let text = self.fallback_message.clone();
        let markup = render::literal_paragraph(&text);
        self.push(Sender::Assistant, text, Some(markup))
    }

    /// Show the typing marker. Does nothing if it is already shown.
    pub fn show_typing(&mut self) {
        if self.typing {
            return;
        }
        self.typing = true;
        self.emit(TranscriptEvent::TypingShown);
    }

    /// Remove the typing marker if it is shown.
    pub fn hide_typing(&mut self) {
        if !self.typing {
            return;
        }
        self.typing = false;
        self.emit(TranscriptEvent::TypingHidden);
    }

    /// Run one send cycle for `text`.
    pub async fn send<B>(&mut self, backend: &B, text: &str) -> SendOutcome
    where
        B: ChatBackend + ?Sized,
    {
        let outgoing = match self.append_user(text) {
            Some(message) => message.raw_text.clone(),
            None => return SendOutcome::Rejected,
        };

        if self.typing {
            tracing::warn!("Send started while another reply is pending");
        }
        self.show_typing();

        let result = backend.send(&outgoing).await;
        self.hide_typing();

        match result {
            Ok(answer) => {
                self.append_assistant(&answer);
                SendOutcome::Answered
            }
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                self.append_fallback();
                SendOutcome::Failed
            }
        }
    }

    /// Send the quick reply at `index`, as if it had been typed. Returns
    /// `None` when quick replies are hidden or the index is out of range.
    pub async fn select_quick_reply<B>(&mut self, backend: &B, index: usize) -> Option<SendOutcome>
    where
        B: ChatBackend + ?Sized,
    {
        let label = self.quick_replies.labels().get(index)?.clone();
        Some(self.send(backend, &label).await)
    }

    fn push(&mut self, sender: Sender, raw_text: String, rendered_markup: Option<String>) -> &Message {
        // An assistant turn takes the marker's place.
        if sender == Sender::Assistant {
            self.hide_typing();
        }

        let message = Message {
            id: id::ascending(IdPrefix::Message),
            sender,
            raw_text,
            rendered_markup,
            ordinal: self.next_ordinal,
            time_created: chrono::Utc::now().timestamp_millis(),
        };
        self.next_ordinal += 1;

        let index = self.messages.len();
        self.messages.push(message);
        let event = TranscriptEvent::MessageAppended(self.messages[index].clone());
        self.emit(event);
        &self.messages[index]
    }

    fn emit(&mut self, event: TranscriptEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        if tx.send(event).is_err() {
            tracing::debug!("Transcript subscriber dropped; no longer publishing events");
            self.events = None;
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return text;
    }
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
