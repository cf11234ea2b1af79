use std::sync::{Arc, Mutex};

use agent_session::{
    connect, AgentHandle, AgentMessage, AgentSession, SessionInput, SessionStatus,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{UiEvent, UiSink};

/// Connects the sidebar to Agent Core: owns the session state machine, feeds
/// it transport events and user input, and pushes every new log entry and
/// status change to the UI.
#[derive(Clone)]
pub struct AgentBridge {
    session: Arc<Mutex<AgentSession>>,
    handle: Arc<Mutex<Option<AgentHandle>>>,
    sink: Arc<dyn UiSink>,
}

impl AgentBridge {
    pub fn new(sink: Arc<dyn UiSink>, cancel_on_stop: bool) -> Self {
        Self {
            session: Arc::new(Mutex::new(
                AgentSession::new().cancel_on_stop(cancel_on_stop),
            )),
            handle: Arc::new(Mutex::new(None)),
            sink,
        }
    }

    /// Open the connection and start forwarding its events. Must be called
    /// from within a tokio runtime.
    pub fn connect(&self, endpoint: &str) -> JoinHandle<()> {
        debug!(%endpoint, "connecting to agent core");
        let (handle, mut events) = connect(endpoint);
        *self.handle.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);

        let bridge = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                bridge.apply(SessionInput::Transport(event));
            }
        })
    }

    pub fn submit(&self, text: String) {
        self.apply(SessionInput::Submit(text));
    }

    pub fn stop(&self) {
        self.apply(SessionInput::Stop);
    }

    pub fn messages(&self) -> Vec<AgentMessage> {
        self.lock_session().messages().to_vec()
    }

    pub fn status(&self) -> SessionStatus {
        self.lock_session().status()
    }

    /// Runs one transition and publishes its effects. The session lock is
    /// held until everything is emitted, so the UI sees log entries in `seq`
    /// order and status changes in transition order.
    fn apply(&self, input: SessionInput) {
        let mut session = self.lock_session();
        let before = session.status();
        let seen = session.messages().len();
        let frame = session.handle(input);

        if let Some(frame) = frame {
            let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).clone();
            match handle {
                Some(handle) => {
                    if let Err(err) = handle.send(frame) {
                        warn!("failed to queue agent frame: {err}");
                    }
                }
                None => warn!("agent frame produced without a connection"),
            }
        }

        for message in session.messages_since(seen) {
            self.sink.emit(UiEvent::AgentMessage(message.clone()));
        }
        let after = session.status();
        if before != after {
            self.sink.emit(UiEvent::AgentStatus(after));
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, AgentSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::RecordingSink;
    use agent_session::{MessageKind, Role, SessionEvent, SessionState};

    #[test]
    fn disconnected_submission_logs_user_and_error() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = AgentBridge::new(sink.clone(), true);

        bridge.submit("weather today".into());

        let log = bridge.messages();
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].role, log[0].content.as_str()), (Role::User, "weather today"));
        assert_eq!(log[1].content, "Agent Core not connected");
        assert_eq!(log[1].status, Some(MessageKind::Error));
        assert!(!bridge.status().processing);
        assert_eq!(bridge.status().state, SessionState::Connecting);
        assert_eq!(sink.channels(), vec!["agent-message", "agent-message"]);
    }

    /// Sink that stalls on user entries, widening the window in which a
    /// reply can land while the submission is still being published.
    #[derive(Default)]
    struct SlowSink {
        events: std::sync::Mutex<Vec<UiEvent>>,
    }

    impl UiSink for SlowSink {
        fn emit(&self, event: UiEvent) {
            if matches!(&event, UiEvent::AgentMessage(m) if m.role == Role::User) {
                std::thread::sleep(std::time::Duration::from_millis(200));
            }
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn reply_during_slow_submit_is_published_in_order() {
        let sink = Arc::new(SlowSink::default());
        let bridge = AgentBridge::new(sink.clone(), true);
        bridge.apply(SessionInput::Transport(SessionEvent::Connected));

        let submitter = {
            let bridge = bridge.clone();
            std::thread::spawn(move || bridge.submit("weather today".into()))
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        bridge.apply(SessionInput::Transport(SessionEvent::Received(
            r#"{"type":"done","message":"sunny"}"#.into(),
        )));
        submitter.join().unwrap();

        let events = sink.events.lock().unwrap();
        let seqs: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                UiEvent::AgentMessage(m) => Some(m.seq),
                _ => None,
            })
            .collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        let logged: Vec<_> = bridge.messages().iter().map(|m| m.seq).collect();
        assert_eq!(logged, seqs);

        let processing: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                UiEvent::AgentStatus(s) => Some(s.processing),
                _ => None,
            })
            .collect();
        assert_eq!(processing, vec![false, true, false]);
        assert!(!bridge.status().processing);
    }

    #[test]
    fn stop_without_turn_emits_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = AgentBridge::new(sink.clone(), true);
        bridge.stop();
        assert!(sink.channels().is_empty());
        assert!(bridge.messages().is_empty());
    }
}
