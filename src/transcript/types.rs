//! Transcript data types.

use serde::{Deserialize, Serialize};

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// One turn of the transcript.
///
/// User messages are shown literally and have no markup. Assistant messages
/// carry the rendered markup produced when they were appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_markup: Option<String>,
    /// Position in the transcript; decides display order.
    pub ordinal: u64,
    /// Creation time in milliseconds since the epoch.
    pub time_created: i64,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Render-ready view of the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptEntry<'a> {
    Message(&'a Message),
    /// Typing marker; only ever the last entry.
    Typing,
}

/// Mutation notifications, delivered in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    MessageAppended(Message),
    TypingShown,
    TypingHidden,
    QuickRepliesHidden,
}

/// Quick-reply disclosure. `Visible` turns into `Hidden` once and never back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickReplies {
    Visible(Vec<String>),
    Hidden,
}

impl QuickReplies {
    pub fn labels(&self) -> &[String] {
        match self {
            QuickReplies::Visible(labels) => labels,
            QuickReplies::Hidden => &[],
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, QuickReplies::Visible(_))
    }

    /// Hide the set. Returns true only on the call that performed the
    /// transition.
    pub(crate) fn hide(&mut self) -> bool {
        if self.is_visible() {
            *self = QuickReplies::Hidden;
            true
        } else {
            false
        }
    }
}

/// How a send cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty after trimming; nothing changed.
    Rejected,
    /// The endpoint answered and the reply was appended.
    Answered,
    /// The request failed and the fallback turn was appended.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_replies_hide_once() {
        let mut replies = QuickReplies::Visible(vec!["a".to_string()]);
        assert_eq!(replies.labels(), ["a".to_string()]);
        assert!(replies.hide());
        assert!(!replies.hide());
        assert!(replies.labels().is_empty());
        assert!(!replies.is_visible());
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let json = serde_json::to_string(&Sender::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
