use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Status tag carried by every inbound agent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Done,
}

impl MessageKind {
    /// Maps a wire tag to a kind. Unknown or missing tags are `Info`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("success") => MessageKind::Success,
            Some("warning") => MessageKind::Warning,
            Some("error") => MessageKind::Error,
            Some("done") => MessageKind::Done,
            _ => MessageKind::Info,
        }
    }

    /// `done` and `error` end the current turn.
    pub fn is_terminal(self) -> bool {
        matches!(self, MessageKind::Done | MessageKind::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Success => "success",
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
            MessageKind::Done => "done",
        }
    }
}

/// Frames sent from the shell to the agent service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ClientFrame {
    /// `{ "task": "..." }`
    Task { task: String },
    /// `{ "cancel": true }`, sent when the user stops a running turn.
    Cancel { cancel: bool },
}

impl ClientFrame {
    pub fn task(text: impl Into<String>) -> Self {
        ClientFrame::Task { task: text.into() }
    }

    pub fn cancel() -> Self {
        ClientFrame::Cancel { cancel: true }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A decoded inbound message.
///
/// Decoding never fails: anything that is not a JSON object becomes an
/// `Info` message carrying the raw text, and an object without a string
/// `message` field carries its own serialisation as content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerMessage {
    pub kind: MessageKind,
    pub message: String,
}

impl ServerMessage {
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => {
                let kind = MessageKind::from_tag(map.get("type").and_then(Value::as_str));
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .unwrap_or_else(|| Value::Object(map).to_string());
                Self { kind, message }
            }
            _ => Self {
                kind: MessageKind::Info,
                message: raw.to_string(),
            },
        }
    }
}
