pub mod agent_bridge;
pub mod app_state;
pub mod context;
pub mod error;
pub mod events;
pub mod host;
pub mod layout;
pub mod settings;
pub mod shell;
pub mod tabs;

#[cfg(feature = "desktop")]
pub mod commands;
#[cfg(feature = "desktop")]
pub mod surface;

// Re-export commonly used items at the crate root
pub use app_state::AppState;
pub use error::{Result, ShellError};
