use crate::tabs::TabId;

pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors surfaced by the shell to its command layer.
#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    #[error("tab not found: {0}")]
    TabNotFound(TabId),
    #[error("unable to resolve settings directory")]
    SettingsDir,
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings decoding failed: {0}")]
    Decode(#[from] serde_json::Error),
}
