/// Convenient result alias for agent session operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors raised while talking to the Agent Core service.
#[derive(thiserror::Error, Debug)]
pub enum AgentError {
    /// The WebSocket handshake with the agent endpoint failed.
    #[error("failed to connect to agent endpoint {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    /// Reading from or writing to an established connection failed.
    #[error("agent transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    /// An outbound frame could not be serialised.
    #[error("failed to encode agent frame: {0}")]
    Encode(#[from] serde_json::Error),
    /// The connection task has exited and no longer accepts frames.
    #[error("agent connection is closed")]
    ChannelClosed,
}
