//! Session protocol for the Agent Core sidebar of the Aeternus shell.
//!
//! The crate is split in three layers:
//!
//! * [`protocol`]: the JSON frames exchanged with the agent service.
//! * [`session`]: a sans-IO state machine that turns transport events and
//!   user input into an append-only message log and outbound frames.
//! * [`transport`]: a tokio task that owns the WebSocket and feeds
//!   [`SessionEvent`]s back to whoever drives the session.
//!
//! ```ignore
//! use agent_session::{connect, AgentSession, SessionInput};
//!
//! # async fn demo() -> agent_session::Result<()> {
//! let (handle, mut events) = connect("ws://localhost:8000/ws/agent");
//! let mut session = AgentSession::new();
//! while let Some(event) = events.recv().await {
//!     if let Some(frame) = session.handle(SessionInput::Transport(event)) {
//!         handle.send(frame)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use error::{AgentError, Result};
pub use protocol::{ClientFrame, MessageKind, ServerMessage};
pub use session::{AgentMessage, AgentSession, Role, SessionInput, SessionState, SessionStatus};
pub use transport::{connect, AgentHandle, SessionEvent};
