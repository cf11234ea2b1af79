use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::protocol::{ClientFrame, MessageKind, ServerMessage};
use crate::transport::SessionEvent;

const CONNECTED_MESSAGE: &str = "Connected to Agent Core";
const DISCONNECTED_MESSAGE: &str = "Disconnected";
const NOT_CONNECTED_MESSAGE: &str = "Agent Core not connected";
const STOPPED_MESSAGE: &str = "Stopped by user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One entry of the sidebar log. Entries are never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub seq: u64,
    /// Turn the entry belongs to; 0 for entries logged before the first task.
    pub turn: u64,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: SessionState,
    pub processing: bool,
}

/// Everything that can move the session forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Transport(SessionEvent),
    Submit(String),
    Stop,
}

/// Sans-IO session state machine.
///
/// `handle` is the only transition function; it returns the frame the caller
/// must put on the wire, if any.
#[derive(Debug)]
pub struct AgentSession {
    state: SessionState,
    processing: bool,
    turn: u64,
    cancel_on_stop: bool,
    log: Vec<AgentMessage>,
}

impl Default for AgentSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Connecting,
            processing: false,
            turn: 0,
            cancel_on_stop: true,
            log: Vec::new(),
        }
    }

    /// Whether stopping a running turn also sends `{ "cancel": true }`.
    pub fn cancel_on_stop(mut self, enabled: bool) -> Self {
        self.cancel_on_stop = enabled;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            processing: self.processing,
        }
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.log
    }

    /// Entries appended after the first `seq` entries.
    pub fn messages_since(&self, seq: usize) -> &[AgentMessage] {
        self.log.get(seq..).unwrap_or(&[])
    }

    pub fn handle(&mut self, input: SessionInput) -> Option<ClientFrame> {
        match input {
            SessionInput::Transport(event) => {
                self.on_transport(event);
                None
            }
            SessionInput::Submit(text) => self.on_submit(text),
            SessionInput::Stop => self.on_stop(),
        }
    }

    fn on_transport(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => {
                debug!("agent session open");
                self.state = SessionState::Open;
                self.push_agent(CONNECTED_MESSAGE.to_string(), MessageKind::Success);
            }
            SessionEvent::Received(raw) => {
                let message = ServerMessage::decode(&raw);
                if message.kind.is_terminal() {
                    self.processing = false;
                }
                self.push_agent(message.message, message.kind);
            }
            SessionEvent::TransportError(detail) => {
                self.processing = false;
                self.push_agent(format!("Connection error: {detail}"), MessageKind::Error);
            }
            SessionEvent::Closed => {
                if self.state == SessionState::Closed {
                    return;
                }
                debug!("agent session closed");
                self.state = SessionState::Closed;
                self.processing = false;
                self.push_agent(DISCONNECTED_MESSAGE.to_string(), MessageKind::Warning);
            }
        }
    }

    fn on_submit(&mut self, text: String) -> Option<ClientFrame> {
        if text.trim().is_empty() || self.processing {
            return None;
        }

        self.turn += 1;
        self.push(Role::User, text.clone(), None);

        if self.state != SessionState::Open {
            self.push_agent(NOT_CONNECTED_MESSAGE.to_string(), MessageKind::Error);
            return None;
        }

        self.processing = true;
        debug!(turn = self.turn, "submitting agent task");
        Some(ClientFrame::task(text))
    }

    fn on_stop(&mut self) -> Option<ClientFrame> {
        if !self.processing {
            return None;
        }
        self.processing = false;
        self.push_agent(STOPPED_MESSAGE.to_string(), MessageKind::Error);

        (self.cancel_on_stop && self.state == SessionState::Open).then(ClientFrame::cancel)
    }

    fn push_agent(&mut self, content: String, kind: MessageKind) {
        self.push(Role::Agent, content, Some(kind));
    }

    fn push(&mut self, role: Role, content: String, status: Option<MessageKind>) {
        self.log.push(AgentMessage {
            seq: self.log.len() as u64,
            turn: self.turn,
            role,
            content,
            status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_session() -> AgentSession {
        let mut session = AgentSession::new();
        session.handle(SessionInput::Transport(SessionEvent::Connected));
        session
    }

    fn receive(session: &mut AgentSession, raw: &str) {
        session.handle(SessionInput::Transport(SessionEvent::Received(raw.to_string())));
    }

    #[test]
    fn connect_logs_success() {
        let session = open_session();
        assert_eq!(session.state(), SessionState::Open);
        let entry = &session.messages()[0];
        assert_eq!(entry.content, "Connected to Agent Core");
        assert_eq!(entry.status, Some(MessageKind::Success));
        assert_eq!(entry.turn, 0);
    }

    #[test]
    fn submit_sends_raw_text_and_sets_processing() {
        let mut session = open_session();
        let frame = session.handle(SessionInput::Submit("  find flights ".into()));
        assert_eq!(frame, Some(ClientFrame::task("  find flights ")));
        assert!(session.is_processing());
        let last = session.messages().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.status, None);
        assert_eq!(last.turn, 1);
    }

    #[test]
    fn blank_submission_is_ignored() {
        let mut session = open_session();
        assert!(session.handle(SessionInput::Submit("   ".into())).is_none());
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_processing());
    }

    #[test]
    fn submit_while_processing_is_rejected() {
        let mut session = open_session();
        session.handle(SessionInput::Submit("first".into()));
        let before = session.messages().len();

        assert!(session.handle(SessionInput::Submit("second".into())).is_none());
        assert_eq!(session.messages().len(), before);
        assert_eq!(session.turn(), 1);
    }

    #[test]
    fn terminal_tags_end_the_turn() {
        let mut session = open_session();
        session.handle(SessionInput::Submit("task".into()));

        receive(&mut session, r#"{"type":"info","message":"Received: task"}"#);
        assert!(session.is_processing());
        receive(&mut session, r#"{"type":"step","step":1}"#);
        assert!(session.is_processing());
        receive(&mut session, r#"{"type":"done","result":"ok"}"#);
        assert!(!session.is_processing());

        session.handle(SessionInput::Submit("again".into()));
        receive(&mut session, r#"{"type":"error","message":"no browser"}"#);
        assert!(!session.is_processing());
        assert_eq!(session.messages().last().unwrap().turn, 2);
    }

    #[test]
    fn submit_while_disconnected_logs_user_and_error() {
        let mut session = AgentSession::new();
        let frame = session.handle(SessionInput::Submit("weather today".into()));
        assert!(frame.is_none());
        assert!(!session.is_processing());

        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, Role::User);
        assert_eq!(log[0].content, "weather today");
        assert_eq!(log[1].content, "Agent Core not connected");
        assert_eq!(log[1].status, Some(MessageKind::Error));
    }

    #[test]
    fn stop_is_local_and_optionally_cancels() {
        let mut session = open_session();
        session.handle(SessionInput::Submit("long task".into()));
        assert_eq!(session.handle(SessionInput::Stop), Some(ClientFrame::cancel()));
        assert!(!session.is_processing());
        assert_eq!(session.messages().last().unwrap().content, "Stopped by user");

        assert!(session.handle(SessionInput::Stop).is_none());

        let mut quiet = open_session().cancel_on_stop(false);
        quiet.handle(SessionInput::Submit("long task".into()));
        assert!(quiet.handle(SessionInput::Stop).is_none());
        assert!(!quiet.is_processing());
    }

    #[test]
    fn close_warns_once_and_clears_processing() {
        let mut session = open_session();
        session.handle(SessionInput::Submit("task".into()));
        session.handle(SessionInput::Transport(SessionEvent::TransportError(
            "reset by peer".into(),
        )));
        session.handle(SessionInput::Transport(SessionEvent::Closed));
        session.handle(SessionInput::Transport(SessionEvent::Closed));

        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.is_processing());
        let tail: Vec<_> = session
            .messages_since(2)
            .iter()
            .map(|m| (m.content.as_str(), m.status))
            .collect();
        assert_eq!(
            tail,
            vec![
                ("Connection error: reset by peer", Some(MessageKind::Error)),
                ("Disconnected", Some(MessageKind::Warning)),
            ]
        );
    }

    #[test]
    fn messages_since_past_end_is_empty() {
        let session = open_session();
        assert!(session.messages_since(10).is_empty());
    }
}
