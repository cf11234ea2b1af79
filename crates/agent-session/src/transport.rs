use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::protocol::ClientFrame;

/// Transport-level events delivered to the session, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    /// A text frame (binary frames are decoded lossily as UTF-8).
    Received(String),
    TransportError(String),
    Closed,
}

/// Sending half of a live agent connection.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    endpoint: String,
    outbound: mpsc::UnboundedSender<ClientFrame>,
}

impl AgentHandle {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Queues a frame for the connection task. Fire-and-forget: delivery
    /// failures surface as `SessionEvent::TransportError`.
    pub fn send(&self, frame: ClientFrame) -> Result<()> {
        self.outbound
            .send(frame)
            .map_err(|_| AgentError::ChannelClosed)
    }
}

/// Opens a single connection to the agent endpoint on the current tokio
/// runtime. The connection is never retried; once `SessionEvent::Closed` is
/// delivered the handle is dead.
pub fn connect(
    endpoint: impl Into<String>,
) -> (AgentHandle, mpsc::UnboundedReceiver<SessionEvent>) {
    let endpoint = endpoint.into();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    tokio::spawn(run_connection(endpoint.clone(), outbound_rx, events_tx));

    (
        AgentHandle {
            endpoint,
            outbound: outbound_tx,
        },
        events_rx,
    )
}

async fn run_connection(
    endpoint: String,
    mut outbound: mpsc::UnboundedReceiver<ClientFrame>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let stream = match connect_async(endpoint.as_str()).await {
        Ok((stream, _)) => stream,
        Err(source) => {
            let err = AgentError::Connect { endpoint, source };
            warn!("{err}");
            let _ = events.send(SessionEvent::TransportError(err.to_string()));
            let _ = events.send(SessionEvent::Closed);
            return;
        }
    };
    debug!(%endpoint, "agent connection established");
    let _ = events.send(SessionEvent::Connected);

    let (mut sink, mut stream) = stream.split();
    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    let _ = sink.close().await;
                    break;
                };
                let text = match frame.encode() {
                    Ok(text) => text,
                    Err(err) => {
                        warn!("{err}");
                        continue;
                    }
                };
                if let Err(err) = sink.send(Message::Text(text)).await {
                    let err = AgentError::from(err);
                    warn!("{err}");
                    let _ = events.send(SessionEvent::TransportError(err.to_string()));
                    break;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(SessionEvent::Received(text));
                }
                Some(Ok(Message::Binary(data))) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    let _ = events.send(SessionEvent::Received(text));
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(reason = ?frame.map(|f| f.reason.into_owned()), "agent closed connection");
                    break;
                }
                // Ping/pong replies are queued by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    let err = AgentError::from(err);
                    warn!("{err}");
                    let _ = events.send(SessionEvent::TransportError(err.to_string()));
                    break;
                }
                None => break,
            }
        }
    }

    let _ = events.send(SessionEvent::Closed);
}
