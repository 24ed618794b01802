//! HTML presentation of a transcript.
//!
//! Turns controller entries into the chat panel's markup. User text is always
//! escaped; assistant turns use the markup stored when they were appended.

use crate::render::{escape_html, literal_paragraph};
use crate::transcript::{Message, Sender, TranscriptController, TranscriptEntry};

const TYPING_INDICATOR: &str = concat!(
    r#"<div class="message bot typing"><div class="typing-indicator">"#,
    "<span></span><span></span><span></span>",
    "</div></div>"
);

const STYLESHEET: &str = r#"
body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f8fafc; }
.chat-header { padding: 16px 20px; background: linear-gradient(135deg, #4f46e5, #1d4ed8); color: #fff; font-weight: 600; }
.chat-messages { display: flex; flex-direction: column; gap: 12px; padding: 20px; max-width: 720px; margin: 0 auto; }
.message { display: flex; }
.message.user { justify-content: flex-end; }
.message-content { max-width: 80%; padding: 10px 14px; font-size: 14px; line-height: 1.5; }
.message.bot .message-content { background: #fff; color: #1f2937; border-radius: 18px 18px 18px 6px; }
.message.user .message-content { background: linear-gradient(135deg, #4f46e5, #2563eb); color: #eff6ff; border-radius: 18px 18px 6px 18px; white-space: pre-wrap; }
.message-content p { margin: 0 0 8px; }
.message-content p:last-child { margin-bottom: 0; }
.message-content code { background: #e5e7eb; padding: 1px 5px; border-radius: 6px; font-size: 12px; font-family: 'SF Mono', Menlo, Monaco, monospace; }
.message-content h1 { font-size: 17px; }
.message-content h2 { font-size: 16px; }
.message-content h3 { font-size: 15px; }
.message-content a { color: #4f46e5; }
.typing-indicator { display: flex; gap: 4px; padding: 12px 14px; background: #fff; border-radius: 999px; }
.typing-indicator span { width: 6px; height: 6px; border-radius: 50%; background: #94a3b8; }
.quick-replies { display: flex; flex-wrap: wrap; gap: 8px; padding: 0 20px 20px; max-width: 720px; margin: 0 auto; }
.quick-reply { border: none; border-radius: 999px; padding: 6px 12px; font-size: 13px; background: #e0f2fe; cursor: pointer; }
"#;

/// Markup for a single transcript entry.
pub fn render_entry(entry: &TranscriptEntry<'_>) -> String {
    match entry {
        TranscriptEntry::Message(message) => render_message(message),
        TranscriptEntry::Typing => TYPING_INDICATOR.to_string(),
    }
}

/// Markup for one message bubble.
pub fn render_message(message: &Message) -> String {
    let (class, content) = match message.sender {
        Sender::User => ("user", escape_html(&message.raw_text)),
        // Markup is always present for assistant turns appended through the
        // controller; escape the raw text for anything else.
        Sender::Assistant => (
            "bot",
            message
                .rendered_markup
                .clone()
                .unwrap_or_else(|| literal_paragraph(&message.raw_text)),
        ),
    };
    bubble(class, &content)
}

fn bubble(class: &str, content: &str) -> String {
    format!(
        r#"<div class="message {}"><div class="message-content">{}</div></div>"#,
        class, content
    )
}

/// Quick-reply buttons, or an empty string once they are hidden.
pub fn render_quick_replies(labels: &[String]) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let mut out = String::from(r#"<div class="quick-replies">"#);
    for label in labels {
        out.push_str(&format!(
            r#"<button class="quick-reply" type="button">{}</button>"#,
            escape_html(label)
        ));
    }
    out.push_str("</div>");
    out
}

/// The message list followed by any quick replies.
pub fn render_transcript(controller: &TranscriptController) -> String {
    let mut out = String::from(r#"<div class="chat-messages">"#);
    for entry in controller.entries() {
        out.push_str(&render_entry(&entry));
    }
    out.push_str("</div>");
    out.push_str(&render_quick_replies(controller.list_quick_replies()));
    out
}

/// A standalone page showing the whole chat panel.
pub fn render_page(title: &str, controller: &TranscriptController) -> String {
    let body = format!(
        r#"<header class="chat-header">{}</header>{}"#,
        escape_html(title),
        render_transcript(controller)
    );
    render_document(title, &body)
}

/// A page showing already rendered markup as a single assistant bubble.
pub fn render_markup_page(title: &str, markup: &str) -> String {
    let body = format!(
        r#"<div class="chat-messages">{}</div>"#,
        bubble("bot", markup)
    );
    render_document(title, &body)
}

/// Wrap `body` markup in a complete HTML document with the panel stylesheet.
pub fn render_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        STYLESHEET,
        body
    )
}
