use async_trait::async_trait;
use chat_widget::client::{ChatBackend, SendError};
use chat_widget::render::render;
use chat_widget::transcript::{
    ControllerOptions, SendOutcome, Sender, TranscriptController, TranscriptEntry, TranscriptEvent,
};
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use tokio::sync::{mpsc, Notify};

/// Replies from a fixed script and records what it was sent.
struct ScriptedBackend {
    replies: Mutex<Vec<Result<String, SendError>>>,
    received: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new(mut replies: Vec<Result<String, SendError>>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            received: Mutex::new(Vec::new()),
        }
    }

    fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send(&self, message: &str) -> Result<String, SendError> {
        self.received.lock().unwrap().push(message.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(SendError::Status(500)))
    }
}

/// Holds its answer until released.
struct GatedBackend {
    release: Notify,
}

#[async_trait]
impl ChatBackend for GatedBackend {
    async fn send(&self, _message: &str) -> Result<String, SendError> {
        self.release.notified().await;
        Ok("Released".to_string())
    }
}

fn quick_replies() -> Vec<String> {
    vec![
        "What rate could I qualify for?".to_string(),
        "How much can I afford?".to_string(),
    ]
}

fn new_controller() -> TranscriptController {
    TranscriptController::new(ControllerOptions {
        welcome_message: Some("Welcome! Ask me **anything**.".to_string()),
        quick_replies: quick_replies(),
        fallback_message: "Something went wrong <sorry>.".to_string(),
        max_input_chars: 500,
    })
}

fn drain(events: &mut mpsc::UnboundedReceiver<TranscriptEvent>) -> Vec<TranscriptEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn test_successful_cycle() {
    let backend = ScriptedBackend::new(vec![Ok("Hi".to_string())]);
    let mut controller = new_controller();

    let outcome = controller.send(&backend, "hello").await;

    assert_eq!(outcome, SendOutcome::Answered);
    assert_eq!(backend.received(), vec!["hello".to_string()]);

    let messages = controller.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].sender, Sender::User);
    assert_eq!(messages[1].raw_text, "hello");
    assert_eq!(messages[2].sender, Sender::Assistant);
    assert_eq!(messages[2].rendered_markup, Some(render("Hi")));

    assert!(!controller.is_typing());
    assert!(!controller.entries().contains(&TranscriptEntry::Typing));
}

#[tokio::test]
async fn test_failed_cycle_appends_single_fallback() {
    let backend = ScriptedBackend::new(vec![Err(SendError::Malformed("no answer".to_string()))]);
    let mut controller = new_controller();

    let outcome = controller.send(&backend, "hello").await;

    assert_eq!(outcome, SendOutcome::Failed);
    let messages = controller.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].raw_text, "hello");
    assert_eq!(messages[2].raw_text, "Something went wrong <sorry>.");
    assert_eq!(
        messages[2].rendered_markup.as_deref(),
        Some("<p>Something went wrong &lt;sorry&gt;.</p>")
    );
    assert!(!controller.is_typing());
}

#[tokio::test]
async fn test_retry_after_failure() {
    let backend = ScriptedBackend::new(vec![
        Err(SendError::Status(502)),
        Ok("Back online".to_string()),
    ]);
    let mut controller = new_controller();

    assert_eq!(controller.send(&backend, "first").await, SendOutcome::Failed);
    assert_eq!(controller.send(&backend, "second").await, SendOutcome::Answered);

    let texts: Vec<&str> = controller
        .messages()
        .iter()
        .skip(1)
        .map(|m| m.raw_text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec!["first", "Something went wrong <sorry>.", "second", "Back online"]
    );
}

#[tokio::test]
async fn test_blank_send_is_rejected_without_request() {
    let backend = ScriptedBackend::new(vec![Ok("unused".to_string())]);
    let mut controller = new_controller();

    assert_eq!(controller.send(&backend, " \n\t ").await, SendOutcome::Rejected);
    assert!(backend.received().is_empty());
    assert_eq!(controller.messages().len(), 1);
    assert_eq!(controller.list_quick_replies(), quick_replies().as_slice());
}

#[tokio::test]
async fn test_quick_replies_are_one_shot() {
    let backend = ScriptedBackend::new(vec![Ok("a".to_string()), Ok("b".to_string())]);
    let mut controller = new_controller();
    assert_eq!(controller.list_quick_replies(), quick_replies().as_slice());

    let outcome = controller.select_quick_reply(&backend, 1).await;
    assert_eq!(outcome, Some(SendOutcome::Answered));
    assert_eq!(backend.received(), vec!["How much can I afford?".to_string()]);
    assert!(controller.list_quick_replies().is_empty());

    controller.send(&backend, "typed").await;
    assert!(controller.list_quick_replies().is_empty());
    assert_eq!(controller.select_quick_reply(&backend, 0).await, None);
}

#[tokio::test]
async fn test_event_stream_order() {
    let backend = ScriptedBackend::new(vec![Ok("one".to_string()), Ok("two".to_string())]);
    let mut controller = new_controller();
    let mut events = controller.subscribe();

    controller.send(&backend, "first").await;
    let first = drain(&mut events);
    assert_eq!(first.len(), 5);
    assert_eq!(first[0], TranscriptEvent::QuickRepliesHidden);
    assert!(matches!(&first[1], TranscriptEvent::MessageAppended(m) if m.raw_text == "first"));
    assert_eq!(first[2], TranscriptEvent::TypingShown);
    assert_eq!(first[3], TranscriptEvent::TypingHidden);
    assert!(matches!(&first[4], TranscriptEvent::MessageAppended(m) if m.raw_text == "one"));

    controller.send(&backend, "second").await;
    let second = drain(&mut events);
    assert_eq!(second.len(), 4);
    assert!(matches!(&second[0], TranscriptEvent::MessageAppended(m) if m.is_user()));
    assert_eq!(second[1], TranscriptEvent::TypingShown);
    assert_eq!(second[2], TranscriptEvent::TypingHidden);
    assert!(matches!(&second[3], TranscriptEvent::MessageAppended(m) if !m.is_user()));
}

#[tokio::test]
async fn test_marker_is_visible_while_request_is_pending() {
    let backend = GatedBackend {
        release: Notify::new(),
    };
    let mut controller = new_controller();
    let mut events = controller.subscribe();

    let observer = async {
        let mut seen = Vec::new();
        while seen.last() != Some(&TranscriptEvent::TypingShown) {
            seen.push(events.recv().await.unwrap());
        }
        // Nothing else happens until the backend answers.
        assert!(events.try_recv().is_err());
        backend.release.notify_one();
        seen
    };

    let (outcome, seen) = tokio::join!(controller.send(&backend, "hello"), observer);

    assert_eq!(outcome, SendOutcome::Answered);
    assert_eq!(seen.len(), 3);
    assert_eq!(controller.messages().last().unwrap().raw_text, "Released");
    assert!(!controller.is_typing());
}

#[test]
fn test_controllers_are_independent() {
    let mut first = new_controller();
    let second = new_controller();

    first.append_user("hi");

    assert!(first.list_quick_replies().is_empty());
    assert_eq!(second.list_quick_replies(), quick_replies().as_slice());
    assert_ne!(first.session_id(), second.session_id());
}
